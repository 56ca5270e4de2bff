use audcore::{
    location::Location,
    logs::LogSearchParams,
    permission::Permissions,
    repo::{
        RepoCreation,
        RepoStatus,
    },
    resource::{
        Resource,
        SearchFilter,
        traits::{
            ListBackend,
            MutationBackend,
        },
    },
};
use audctrl::{
    client::{
        AccountApi,
        ApiClient,
        ApikeyApi,
        LogApi,
        RepoApi,
        UserApi,
    },
    conf::Builder,
    flow::FlowState,
    listing::{
        Column,
        ListView,
        ResourceManager,
        columns::{
            apikey_columns,
            log_columns,
            repo_columns,
            user_columns,
        },
        fetch_all,
    },
    query::QueryCache,
    state::MemoryState,
};
use clap::{
    Parser,
    Subcommand,
};
use std::sync::Arc;

#[derive(Debug, Parser)]
struct Cli {
    #[clap(flatten)]
    builder: Builder,
    #[command(subcommand)]
    command: Commands,
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(arg_required_else_help = true)]
    Repo {
        #[command(subcommand)]
        cmd: RepoCmd,
    },
    #[command(arg_required_else_help = true)]
    User {
        #[command(subcommand)]
        cmd: EntityCmd,
    },
    #[command(arg_required_else_help = true)]
    Apikey {
        #[command(subcommand)]
        cmd: ApikeyCmd,
    },
    /// Browse the logs of a repository.
    #[command(arg_required_else_help = true)]
    Log {
        repo_id: String,
        #[clap(long, default_value_t = 1)]
        page: u32,
        /// The log filters, as a query string (e.g. `actor_name=John`).
        #[clap(long)]
        query: Option<String>,
    },
    /// Summarize the permissions of a user or api key.
    #[command(arg_required_else_help = true)]
    Permissions {
        #[command(subcommand)]
        cmd: PermissionsCmd,
    },
    Whoami,
}

#[derive(Debug, Subcommand)]
enum EntityCmd {
    List {
        #[clap(long, default_value_t = 1)]
        page: u32,
        #[clap(long)]
        search: Option<String>,
    },
    #[command(arg_required_else_help = true)]
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum RepoCmd {
    #[command(flatten)]
    Entity(EntityCmd),
    #[command(arg_required_else_help = true)]
    Create {
        name: String,
        #[clap(long, default_value = "enabled")]
        status: RepoStatus,
    },
}

#[derive(Debug, Subcommand)]
enum ApikeyCmd {
    #[command(flatten)]
    Entity(EntityCmd),
    /// Replace the secret of an api key and print the new one.
    #[command(arg_required_else_help = true)]
    Regenerate {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum PermissionsCmd {
    #[command(arg_required_else_help = true)]
    User {
        id: String,
    },
    #[command(arg_required_else_help = true)]
    Apikey {
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    stderrlog::new()
        .module(module_path!())
        .module("audcore")
        .module("audctrl")
        .verbosity((args.verbose as usize) + 1)
        .timestamp(stderrlog::Timestamp::Second)
        .init()?;

    let client = args.builder.build()?;
    let cache = QueryCache::new();

    match args.command {
        Commands::Repo { cmd } => parse_repo(client, cache, cmd).await?,
        Commands::User { cmd } => {
            parse_entity(
                manager(UserApi::new(client), cache, user_columns()),
                cmd,
            ).await?;
        }
        Commands::Apikey { cmd } => parse_apikey(client, cache, cmd).await?,
        Commands::Log { repo_id, page, query } => {
            let params = match query {
                Some(query) => LogSearchParams::from_query(&query)?,
                None => LogSearchParams::default(),
            };
            let params = LogSearchParams {
                repo_id: repo_id.clone(),
                .. params
            };
            let manager = ResourceManager::new(
                Arc::new(LogApi::new(client, repo_id)),
                Arc::new(MemoryState::new(Location::new("/logs"))),
                cache,
            )
                .with_columns(log_columns())
                .with_filter(move |_| params.clone());
            manager.state().set_page(page);
            print_list(&manager).await?;
        }
        Commands::Permissions { cmd } => parse_permissions(client, cmd).await?,
        Commands::Whoami => {
            let session = AccountApi::new(client).session().await?;
            println!("{session}");
        }
    }

    Ok(())
}

fn manager<B: ListBackend>(
    backend: B,
    cache: QueryCache,
    columns: Vec<Column<B::Resource>>,
) -> ResourceManager<B> {
    ResourceManager::new(
        Arc::new(backend),
        Arc::new(MemoryState::new(Location::new("/"))),
        cache,
    )
        .with_columns(columns)
}

async fn parse_repo(
    client: ApiClient,
    cache: QueryCache,
    cmd: RepoCmd,
) -> anyhow::Result<()> {
    let manager = manager(RepoApi::new(client), cache, repo_columns());
    match cmd {
        RepoCmd::Entity(cmd) => parse_entity(manager, cmd).await?,
        RepoCmd::Create { name, status } => {
            let flow = manager.create_flow();
            flow.open()?;
            match flow.submit(RepoCreation { name, status }).await? {
                Some(created) => println!("created repo {}", created.id),
                None => anyhow::bail!("{}", flow_error(&flow.state())),
            }
        }
    }
    Ok(())
}

async fn parse_apikey(
    client: ApiClient,
    cache: QueryCache,
    cmd: ApikeyCmd,
) -> anyhow::Result<()> {
    match cmd {
        ApikeyCmd::Entity(cmd) => {
            parse_entity(manager(ApikeyApi::new(client), cache, apikey_columns()), cmd).await?;
        }
        ApikeyCmd::Regenerate { id } => {
            let secret = ApikeyApi::new(client).regenerate_key(&id).await?;
            println!("new key for {}: {}", secret.id, secret.key);
        }
    }
    Ok(())
}

async fn parse_entity<B>(
    manager: ResourceManager<B>,
    cmd: EntityCmd,
) -> anyhow::Result<()>
where
    B: MutationBackend<Filter = SearchFilter>,
{
    let manager = manager.with_filter(SearchFilter::from_search);
    match cmd {
        EntityCmd::List { page, search } => {
            manager.state().set_page(page);
            manager.state().set_search(search.as_deref().unwrap_or_default());
            print_list(&manager).await?;
        }
        EntityCmd::Delete { id } => {
            let resource = manager.backend().load(&id).await?;
            let flow = manager.delete_flow();
            flow.open(&resource)?;
            if !flow.confirm().await? {
                anyhow::bail!("{}", flow_error(&flow.state()));
            }
            println!("deleted {} {}", manager.backend().kind(), resource.label());
        }
    }
    Ok(())
}

async fn parse_permissions(
    client: ApiClient,
    cmd: PermissionsCmd,
) -> anyhow::Result<()> {
    let permissions: Permissions = match cmd {
        PermissionsCmd::User { id } => UserApi::new(client.clone()).load(&id).await?.permissions,
        PermissionsCmd::Apikey { id } => ApikeyApi::new(client.clone()).load(&id).await?.permissions,
    };
    let repos = fetch_all(&RepoApi::new(client), &SearchFilter::default()).await?;
    let applicable = permissions.applicable(repos.iter().map(|repo| repo.id.as_str()));
    let flags = |read: bool, write: bool| match (read, write) {
        (true, true) => "read, write",
        (true, false) => "read",
        (false, true) => "write",
        (false, false) => "none",
    };

    println!("superadmin: {}", if applicable.is_superadmin { "yes" } else { "no" });
    println!("logs read: {}", applicable.logs.read);
    println!("logs write: {}", applicable.logs.write);
    for repo in repos.iter() {
        let rw = permissions.repo_log_permissions(&repo.id);
        if !rw.is_empty() {
            println!("  {}: {}", repo.name, flags(rw.read, rw.write));
        }
    }
    let management = applicable.management;
    println!("repos: {}", flags(management.repos.read, management.repos.write));
    println!("users: {}", flags(management.users.read, management.users.write));
    println!("apikeys: {}", flags(management.apikeys.read, management.apikeys.write));
    Ok(())
}

fn flow_error(state: &FlowState) -> String {
    state.error()
        .map(|e| e.user_message())
        .unwrap_or_else(|| format!("unexpected state: {}", state.name()))
}

async fn print_list<B: ListBackend>(manager: &ResourceManager<B>) -> anyhow::Result<()> {
    let pagination = match manager.refresh().await {
        ListView::Ready(paged) => paged.pagination,
        ListView::Error(message) => anyhow::bail!("{message}"),
        ListView::Loading => anyhow::bail!("list is unavailable"),
    };
    let headers = manager.headers();
    let rows = manager.render_rows();
    let widths = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain([header.chars().count()])
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();
    let line = |cells: Vec<&str>| {
        cells.iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{cell:<w$}", w = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    println!("{}", line(headers.clone()));
    for row in rows.iter() {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
    println!(
        "page {} of {} ({} total)",
        pagination.page,
        pagination.total_pages,
        pagination.total,
    );
    Ok(())
}

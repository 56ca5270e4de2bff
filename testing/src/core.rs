use async_trait::async_trait;
use audcore::{
    error::BackendError,
    pagination::Paged,
    repo::{
        Repo,
        RepoCreation,
        RepoUpdate,
    },
    resource::{
        CreatedId,
        ResourceKind,
        SearchFilter,
        traits::{
            ListBackend,
            MutationBackend,
        },
    },
    user::{
        User,
        UserCreation,
        UserUpdate,
    },
};
use mockall::mock;

mock! {
    pub RepoBackend {
        pub async fn repo_fetch_page(
            &self,
            page: u32,
            filter: &SearchFilter,
        ) -> Result<Paged<Repo>, BackendError>;
        pub async fn repo_load(
            &self,
            id: &str,
        ) -> Result<Repo, BackendError>;
        pub async fn repo_create(
            &self,
            payload: RepoCreation,
        ) -> Result<CreatedId, BackendError>;
        pub async fn repo_update(
            &self,
            id: &str,
            patch: RepoUpdate,
        ) -> Result<(), BackendError>;
        pub async fn repo_delete(
            &self,
            id: &str,
        ) -> Result<(), BackendError>;
    }
}

mock! {
    pub UserBackend {
        pub async fn user_fetch_page(
            &self,
            page: u32,
            filter: &SearchFilter,
        ) -> Result<Paged<User>, BackendError>;
        pub async fn user_load(
            &self,
            id: &str,
        ) -> Result<User, BackendError>;
        pub async fn user_create(
            &self,
            payload: UserCreation,
        ) -> Result<CreatedId, BackendError>;
        pub async fn user_update(
            &self,
            id: &str,
            patch: UserUpdate,
        ) -> Result<(), BackendError>;
        pub async fn user_delete(
            &self,
            id: &str,
        ) -> Result<(), BackendError>;
    }
}

#[async_trait]
impl ListBackend for MockRepoBackend {
    type Resource = Repo;
    type Filter = SearchFilter;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Repos
    }

    async fn fetch_page(
        &self,
        page: u32,
        filter: &SearchFilter,
    ) -> Result<Paged<Repo>, BackendError> {
        self.repo_fetch_page(page, filter).await
    }

    async fn load(
        &self,
        id: &str,
    ) -> Result<Repo, BackendError> {
        self.repo_load(id).await
    }
}

#[async_trait]
impl MutationBackend for MockRepoBackend {
    type Create = RepoCreation;
    type Created = CreatedId;
    type Update = RepoUpdate;

    async fn create(
        &self,
        payload: RepoCreation,
    ) -> Result<CreatedId, BackendError> {
        self.repo_create(payload).await
    }

    async fn update(
        &self,
        id: &str,
        patch: RepoUpdate,
    ) -> Result<(), BackendError> {
        self.repo_update(id, patch).await
    }

    async fn delete(
        &self,
        id: &str,
    ) -> Result<(), BackendError> {
        self.repo_delete(id).await
    }
}

#[async_trait]
impl ListBackend for MockUserBackend {
    type Resource = User;
    type Filter = SearchFilter;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Users
    }

    async fn fetch_page(
        &self,
        page: u32,
        filter: &SearchFilter,
    ) -> Result<Paged<User>, BackendError> {
        self.user_fetch_page(page, filter).await
    }

    async fn load(
        &self,
        id: &str,
    ) -> Result<User, BackendError> {
        self.user_load(id).await
    }
}

#[async_trait]
impl MutationBackend for MockUserBackend {
    type Create = UserCreation;
    type Created = CreatedId;
    type Update = UserUpdate;

    async fn create(
        &self,
        payload: UserCreation,
    ) -> Result<CreatedId, BackendError> {
        self.user_create(payload).await
    }

    async fn update(
        &self,
        id: &str,
        patch: UserUpdate,
    ) -> Result<(), BackendError> {
        self.user_update(id, patch).await
    }

    async fn delete(
        &self,
        id: &str,
    ) -> Result<(), BackendError> {
        self.user_delete(id).await
    }
}

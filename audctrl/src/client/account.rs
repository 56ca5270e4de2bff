use audcore::{
    ac::{
        CurrentUser,
        ForgotPassword,
        LoginForm,
        PasswordChange,
        PasswordReset,
        Session,
    },
    error::{
        BackendError,
        Error,
    },
    validate::Validate,
};
use reqwest::Method;

use super::{
    ApiClient,
    local,
};

/// Calls made on behalf of the current user.
#[derive(Clone, Debug)]
pub struct AccountApi {
    client: ApiClient,
}

impl AccountApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn me(&self) -> Result<CurrentUser, BackendError> {
        local(self.client.get_json(&["users", "me"])).await
    }

    /// The current session; being refused is not an error but simply
    /// means nobody is logged in.
    pub async fn session(&self) -> Result<Session, BackendError> {
        match self.me().await {
            Ok(user) => Ok(Session::Authenticated(user)),
            Err(BackendError::Authorization) => Ok(Session::Anonymous),
            Err(e) => Err(e),
        }
    }

    pub async fn log_in(&self, form: &LoginForm) -> Result<CurrentUser, Error> {
        form.validate()?;
        let user = local(self.client.post_json(&["auth", "user", "login"], form)).await?;
        Ok(user)
    }

    pub async fn log_out(&self) -> Result<(), BackendError> {
        local(self.client.execute::<()>(Method::POST, &["auth", "user", "logout"], None)).await
    }

    pub async fn change_password(&self, form: &PasswordChange) -> Result<(), Error> {
        form.validate()?;
        local(self.client.execute(Method::PATCH, &["users", "me"], Some(form))).await?;
        Ok(())
    }

    pub async fn forgot_password(&self, form: &ForgotPassword) -> Result<(), Error> {
        form.validate()?;
        local(self.client.execute(Method::POST, &["users", "forgot-password"], Some(form))).await?;
        Ok(())
    }

    pub async fn set_password(&self, form: &PasswordReset) -> Result<(), Error> {
        form.validate()?;
        local(self.client.execute(
            Method::POST,
            &["users", "password-reset", &form.token],
            Some(form),
        )).await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[async_std::test]
    async fn invalid_forms_are_not_sent() -> anyhow::Result<()> {
        // nothing listens here; validation must fail before any request.
        let api = AccountApi::new(ApiClient::new("http://127.0.0.1:9")?);
        let result = api.change_password(&PasswordChange {
            password: "short".into(),
            confirm: "short".into(),
        }).await;
        assert!(matches!(result, Err(Error::Validation(e)) if e.field("password").is_some()));

        let result = api.set_password(&PasswordReset {
            token: "t1".into(),
            password: "hunter22".into(),
            confirm: "hunter23".into(),
        }).await;
        assert!(matches!(result, Err(Error::Validation(e)) if e.field("confirm").is_some()));

        let result = api.log_in(&LoginForm::default()).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        Ok(())
    }
}

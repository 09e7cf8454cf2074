use crate::error::AuthError;
use crate::models::{Profile, Role};
use crate::security::password;
use crate::security::token::SessionTokenCodec;
use crate::stores::PrincipalStore;

/// Resolves bearer tokens and login credentials to principals.
///
/// One code path backs the HTTP user guard, the HTTP admin guard, and the
/// realtime handshake; the three differ only in `required_role`.
pub struct SessionService;

impl SessionService {
    /// Authenticate `raw_token`, optionally demanding a role.
    ///
    /// A principal that exists but lacks the required role surfaces as
    /// [`AuthError::NotAuthenticated`], indistinguishable from an unknown
    /// account.
    pub async fn authenticate(
        principals: &dyn PrincipalStore,
        codec: &SessionTokenCodec,
        raw_token: &str,
        required_role: Option<Role>,
    ) -> Result<Profile, AuthError> {
        let claims = codec.decode(raw_token)?;
        let principal = principals
            .find_by_email(&claims.email, required_role)
            .await
            .map_err(|e| AuthError::Server(e.to_string()))?
            .ok_or(AuthError::NotAuthenticated)?;

        if !password::verify_password(&claims.password, &principal.salt, &principal.password_hash)
        {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(principal.sanitized())
    }

    /// Check `email`/`plaintext` and mint a session token.
    ///
    /// Unknown email and wrong password are both `InvalidCredentials`; the
    /// caller cannot probe which accounts exist.
    pub async fn login(
        principals: &dyn PrincipalStore,
        codec: &SessionTokenCodec,
        email: &str,
        plaintext: &str,
        required_role: Option<Role>,
    ) -> Result<String, AuthError> {
        let principal = principals
            .find_by_email(email, required_role)
            .await
            .map_err(|e| AuthError::Server(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(plaintext, &principal.salt, &principal.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }
        codec.mint(email, plaintext)
    }
}

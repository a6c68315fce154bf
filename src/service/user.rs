use serde::Deserialize;

use crate::app::ctx::Ctx;
use crate::app::AppError;
use crate::auth::password::hash_password;
use crate::database::models::user::{NewUser, User, UserChanges, UserWithRelations};
use crate::database::users::UserRepository;
use crate::service::on_unique_violation;

const DUPLICATE_IDENTITY: &str = "username or email already registered";
const USER_NOT_FOUND: &str = "user not found";

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Update payload; an absent field leaves the stored value untouched.
/// A present `password` is plaintext and gets hashed here exactly once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> UserService<R> {
        UserService { repo }
    }

    /// Registers a new user.
    ///
    /// The username/email pre-check and the insert run in a single
    /// transaction; a commit failure is surfaced, never swallowed. The
    /// returned entity still carries the hashed credential, which the
    /// transport strips before exposure.
    pub fn create_new_user(&self, ctx: &Ctx, request: SignUpRequest) -> Result<User, AppError> {
        validate_signup(&request)?;

        let tx = self.repo.begin_tx(ctx)?;
        match self.signup_in_tx(ctx, &tx, request) {
            Ok(created) => {
                self.repo
                    .commit_tx(ctx, tx)
                    .map_err(|err| on_unique_violation(err, DUPLICATE_IDENTITY))?;
                Ok(created)
            }
            Err(err) => {
                self.repo.rollback_tx(ctx, tx);
                Err(err)
            }
        }
    }

    fn signup_in_tx(&self, ctx: &Ctx, tx: &R::Tx, request: SignUpRequest) -> Result<User, AppError> {
        let existing = self.repo.find_by_username_or_email(
            ctx,
            Some(tx),
            &request.username,
            &request.email,
        )?;
        if existing.is_some() {
            return Err(AppError::Validation(DUPLICATE_IDENTITY.to_string()));
        }

        let password = hash_password(&request.password)?;
        self.repo
            .create_user(
                ctx,
                Some(tx),
                NewUser {
                    name: request.name,
                    username: request.username,
                    email: request.email,
                    password,
                    role: request.role,
                },
            )
            .map_err(|err| on_unique_violation(err, DUPLICATE_IDENTITY))
    }

    pub fn get_all_users(&self, ctx: &Ctx) -> Result<Vec<UserWithRelations>, AppError> {
        self.repo.get_all_users(ctx)
    }

    pub fn get_user_by_username(
        &self,
        ctx: &Ctx,
        username: &str,
    ) -> Result<Option<UserWithRelations>, AppError> {
        self.repo.get_user_by_username(ctx, username)
    }

    /// Applies a field-level update. Only fields present in the request
    /// change; a present password re-fires the hashing step, an absent
    /// one leaves the stored credential untouched.
    pub fn update_user(
        &self,
        ctx: &Ctx,
        username: &str,
        request: UserUpdateRequest,
    ) -> Result<User, AppError> {
        let tx = self.repo.begin_tx(ctx)?;
        match self.update_in_tx(ctx, &tx, username, request) {
            Ok(updated) => {
                self.repo
                    .commit_tx(ctx, tx)
                    .map_err(|err| on_unique_violation(err, DUPLICATE_IDENTITY))?;
                Ok(updated)
            }
            Err(err) => {
                self.repo.rollback_tx(ctx, tx);
                Err(err)
            }
        }
    }

    fn update_in_tx(
        &self,
        ctx: &Ctx,
        tx: &R::Tx,
        username: &str,
        request: UserUpdateRequest,
    ) -> Result<User, AppError> {
        let existing = self
            .repo
            .find_by_username(ctx, Some(tx), username)?
            .ok_or_else(|| AppError::Validation(USER_NOT_FOUND.to_string()))?;

        let password = match request.password {
            Some(plaintext) => Some(hash_password(&plaintext)?),
            None => None,
        };
        let changes = UserChanges {
            name: request.name,
            email: request.email,
            password,
            role: request.role,
            updated_at: None,
        };

        self.repo
            .update_user(ctx, Some(tx), existing.id, changes)
            .map_err(|err| on_unique_violation(err, DUPLICATE_IDENTITY))?
            .ok_or_else(|| AppError::Validation(USER_NOT_FOUND.to_string()))
    }

    /// Soft-deletes a user; the record stays in the store but drops out
    /// of every default read.
    pub fn delete_user(&self, ctx: &Ctx, username: &str) -> Result<(), AppError> {
        let tx = self.repo.begin_tx(ctx)?;
        match self.delete_in_tx(ctx, &tx, username) {
            Ok(()) => self.repo.commit_tx(ctx, tx),
            Err(err) => {
                self.repo.rollback_tx(ctx, tx);
                Err(err)
            }
        }
    }

    fn delete_in_tx(&self, ctx: &Ctx, tx: &R::Tx, username: &str) -> Result<(), AppError> {
        let existing = self
            .repo
            .find_by_username(ctx, Some(tx), username)?
            .ok_or_else(|| AppError::Validation(USER_NOT_FOUND.to_string()))?;
        self.repo.soft_delete_user(ctx, Some(tx), existing.id)
    }
}

fn validate_signup(request: &SignUpRequest) -> Result<(), AppError> {
    let required = [
        ("name", &request.name),
        ("username", &request.username),
        ("email", &request.email),
        ("password", &request.password),
        ("role", &request.role),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{} is required", field)));
        }
    }
    Ok(())
}

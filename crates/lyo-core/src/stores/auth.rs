//! Demo auth gate. There is no backend: any well-formed credentials sign in.

use std::cell::RefCell;
use std::rc::Rc;

use lyo_types::user::User;
use lyo_types::{LyoError, Result};

#[derive(Clone, Default)]
pub struct AuthStore {
    user: Rc<RefCell<Option<User>>>,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let user = validate(email, password)?;
        log::info!("Signed in as {}", user.email);
        *self.user.borrow_mut() = Some(user.clone());
        Ok(user)
    }

    pub fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        let user = validate(email, password)?;
        log::info!("Registered {}", user.email);
        *self.user.borrow_mut() = Some(user.clone());
        Ok(user)
    }

    pub fn sign_out(&self) {
        self.user.borrow_mut().take();
    }

    pub fn user(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.borrow().is_some()
    }
}

fn validate(email: &str, password: &str) -> Result<User> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(LyoError::Validation("a valid email is required".to_string()));
    }
    if password.is_empty() {
        return Err(LyoError::Validation("password is required".to_string()));
    }
    Ok(User { email: email.to_string() })
}

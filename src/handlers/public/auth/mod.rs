// handlers/public/auth/mod.rs - Public authentication handlers

pub mod login;    // POST /auth/login - authenticate and get token pair
pub mod refresh;  // POST /auth/token/refresh - new access token
pub mod register; // POST /auth/register - create account with profile

pub use login::login_post;
pub use refresh::refresh_post;
pub use register::register_post;

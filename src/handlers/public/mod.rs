// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Account creation, token acquisition and the reference lists a client
// needs to render the registration form.

pub mod auth;
pub mod reference;

pub use reference::reference_list;

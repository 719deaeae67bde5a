// handlers/protected/mod.rs - Protected handlers (bearer JWT required)
//
// Routes live under /api and sit behind `jwt_auth_middleware`, which puts
// an `AuthUser` into the request extensions.

pub mod auth;

pub mod migrate;
pub mod reference;
pub mod serve;
pub mod superuser;
pub mod user;

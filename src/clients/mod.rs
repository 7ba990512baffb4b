pub mod da_admin;

pub use da_admin::DaAdminClient;

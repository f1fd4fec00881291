// Skin journey: per-user analysis snapshots kept in the hosted Postgres.
// Every query is scoped to the authenticated owner.

pub mod handlers;
pub mod store;

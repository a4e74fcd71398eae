//! Low-level access to the coordination store shared by every CDC process: a linearizable
//! key-value service with prefix ranges and create-revision ordering (used for elections).
mod backoff;
mod context;
mod dial;
mod etcd;
mod memory;
mod store;

pub(crate) use backoff::ConnectBackoff;
pub(crate) use dial::dial;
pub(crate) use dial::parse_endpoint;
pub use context::ContextError;
pub use context::OpContext;
pub use etcd::EtcdStore;
pub use etcd::StoreConnectError;
pub use memory::MemoryStore;
pub use store::CoordinationStore;
pub use store::KeyValue;
pub use store::StoreError;

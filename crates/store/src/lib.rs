pub mod collection;
pub mod error;
pub mod store;

pub use collection::{
    CollectionHandle, CollectionManifest, EmbeddedChunk, VectorCollection, MANIFEST_VERSION,
};
pub use error::StoreError;
pub use store::VectorStore;

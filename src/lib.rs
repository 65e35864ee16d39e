pub mod arena;
pub mod build;
pub mod constants;
pub mod encode;
pub mod error;
pub mod nav;
pub mod node;
pub mod num;
pub mod options;
pub mod query;
pub mod text;

pub use crate::arena::{NodeId, NodeType, Shape};
pub use crate::build::{build, build_with_options, from_reader, from_serializable, from_slice, from_str};
pub use crate::error::{Error, ErrorKind};
pub use crate::nav::{NavKind, Navigator, Position};
pub use crate::node::{ChildNodes, Document, NodeRef};
pub use crate::num::Scalar;
pub use crate::options::{BuildOptions, CacheOptions, MarkupOptions};
pub use crate::query::{find, find_one, Query, QueryCache, TreeNavigator};

pub type Result<T> = std::result::Result<T, Error>;

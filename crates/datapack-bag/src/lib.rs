#![deny(missing_docs)]

//! # datapack-bag: BagIt Archives
//!
//! Packages a [`DataPackage`](datapack_package::DataPackage) as a zipped
//! BagIt bag and verifies existing bags.
//!
//! ```text
//! <bag id>.zip
//! ├── bagit.txt
//! ├── bag-info.txt          Payload-Oxum, Bagging-Date, Bag-Size
//! ├── pid-mapping.txt       <identifier> data/<file>
//! ├── manifest-md5.txt      <digest> data/<file>
//! ├── tagmanifest-md5.txt   <digest> <tag file>
//! └── data/
//!     ├── <member files>
//!     └── <resource map id>.rdf
//! ```
//!
//! ## Modules
//!
//! - [`builder`]: staging and the ordered build sequence.
//! - [`archive`]: zip writing and reading.
//! - [`info`]: tag file formats and size scaling.
//! - [`verify`]: manifest and Oxum checks on finished archives.
//! - [`config`]: YAML and environment configuration.

pub mod archive;
pub mod builder;
pub mod config;
pub mod error;
pub mod info;
pub mod verify;

pub use builder::BagBuilder;
pub use config::{BagConfig, Compression};
pub use error::{BagError, BagResult};
pub use info::{format_bag_size, BagInfo};
pub use verify::{verify_archive, BagReport, Problem};

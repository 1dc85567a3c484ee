//! Everything about the environment a unit is parsed in: compiler
//! arguments, the toolchain behind them, unsaved buffers, and the
//! descriptor files clang-based tools exchange (VFS overlays and module
//! maps).

mod args;
mod modulemap;
mod overlay;
mod toolchain;
mod unsaved;

pub use args::CompilerArgs;
pub use modulemap::ModuleMapDescriptor;
pub use overlay::VirtualFileOverlay;
pub use toolchain::{GccInstallation, GccVersion, StdLib, Toolchain, host_triple};
pub use unsaved::{FileOverlay, UnsavedFile, normalize_path};

//! Fixed names shared across the build.

/// Dependency id of the base Go toolchain in `buildpack.toml`.
pub const GO_DEPENDENCY_ID: &str = "go";

/// Version constraint that selects the `default-versions` entry.
pub const DEFAULT_VERSION: &str = "default";

/// Build plan entry name the toolchain layer flags are merged from.
pub const GO_PLAN_NAME: &str = "go";

/// Scratch layer holding the base toolchain and the temporary workspaces.
pub const SCRATCH_LAYER_NAME: &str = "temp-go";

/// Layer that ends up holding the tip SDK.
pub const TOOLCHAIN_LAYER_NAME: &str = "go";

/// Module installed with the base toolchain to get the `gotip` wrapper.
pub const GOTIP_MODULE: &str = "golang.org/dl/gotip@latest";

pub const GO_EXECUTABLE: &str = "go";
pub const GOTIP_EXECUTABLE: &str = "gotip";

/// Where `gotip download` leaves the SDK, relative to `HOME`.
pub const GOTIP_SDK_SUBPATH: &[&str] = &["sdk", "gotip"];

/// Prefix of the temporary `GOPATH` created inside the scratch layer.
pub const TEMP_GOPATH_PREFIX: &str = "temp-gopath";

/// Prefix of the temporary `HOME` created inside the scratch layer.
pub const TEMP_HOME_PREFIX: &str = "temp";

pub const BUILDPACK_TOML: &str = "buildpack.toml";

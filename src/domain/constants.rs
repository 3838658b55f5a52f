/// Prefix the build tool prints before source-tree-relative dependency paths.
pub const SOURCE_ROOT_PREFIX: &str = "../../";

/// Marker the graph generator uses for repo-root-relative paths.
pub const ROOT_MARKER: &str = "//";

/// Directory holding generated build-config headers (build_config.h and
/// friends); never declared by hand, so never reported.
pub const GENERATED_CONFIG_DIR: &str = "build";

/// Path fragment identifying generated sources inside an out dir. A declared
/// header under this marker that is absent on disk means the out dir is stale.
pub const GENERATED_SOURCES_MARKER: &str = "/gen/";

pub const HEADER_EXTENSIONS: [&str; 2] = [".h", ".hh"];

/// Suffix of a dependency-trace record header whose deps are current.
pub const VALID_RECORD_SUFFIX: &str = "(VALID)";

/// Build-tool dry-run output marker for a fully built tree.
pub const NO_WORK_MARKER: &str = "no work to do.";

/// Only checkout-tool lines with this literal prefix name nested repos.
pub const OWNERSHIP_LINE_PREFIX: &str = "src/";

/// The blob store allocates in whole blocks; compressed sizes are rounded up
/// to this granularity.
pub const BLOB_BLOCK_SIZE: u64 = 8192;

pub const META_ARCHIVE_NAME: &str = "meta.far";
pub const BLOB_CONTENTS_PATH: &str = "meta/contents";

/// Blobs never charged against a package budget, beyond the SDK scan.
pub const FIXED_EXCLUDED_BLOBS: [&str; 1] = ["icudtl.dat"];

/// A budget metric named `<package>_compressed` checks that package's
/// compressed size.
pub const COMPRESSED_METRIC_SUFFIX: &str = "_compressed";

pub fn is_header(path: &str) -> bool {
    HEADER_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

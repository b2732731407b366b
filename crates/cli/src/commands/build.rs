use iconsmith_core::BuildConfig;

use crate::cli::BuildArgs;

impl BuildArgs {
    pub fn to_config(&self) -> BuildConfig {
        let mut config = BuildConfig::new(&self.root);
        config.dist = self.dist.clone();
        config.product_version = self.product_version.clone();
        config.allocate_codepoints = self.allocate_codepoints;
        config
    }
}

/// Run the build pipeline. Failures are logged by the pipeline itself.
pub fn build(args: &BuildArgs) -> bool {
    iconsmith_core::build(args.to_config()).is_ok()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_args_map_to_config() {
        let args = BuildArgs {
            root: PathBuf::from("/project"),
            dist: Some(PathBuf::from("/out")),
            product_version: Some("2.0.0".to_string()),
            allocate_codepoints: true,
        };
        let config = args.to_config();
        assert_eq!(config.root, PathBuf::from("/project"));
        assert_eq!(config.paths().fonts_dest, PathBuf::from("/out/fonts"));
        assert_eq!(config.product_version.as_deref(), Some("2.0.0"));
        assert!(config.allocate_codepoints);
        assert_eq!(config.font_name, "element-icons");
    }
}

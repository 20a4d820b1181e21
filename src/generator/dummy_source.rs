//! Dummy source generation

use crate::path_utils::sanitize_identifier;

/// A minimal compiled translation unit so header-only pods still produce a
/// linkable product.
pub fn generate(label: &str) -> String {
    let class = format!("PodsDummy_{}", sanitize_identifier(label));
    format!(
        "#import <Foundation/Foundation.h>\n@interface {class} : NSObject\n@end\n@implementation {class}\n@end\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_class_declaration() {
        assert_eq!(
            generate("BananaLib"),
            "#import <Foundation/Foundation.h>\n@interface PodsDummy_BananaLib : NSObject\n@end\n@implementation PodsDummy_BananaLib\n@end\n"
        );
    }

    #[test]
    fn test_label_is_sanitized() {
        let source = generate("banana-lib");
        assert!(source.contains("@interface PodsDummy_banana_lib : NSObject"));
    }
}

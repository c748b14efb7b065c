//! Preview frame matrix

use serde::{Deserialize, Serialize};

/// One preview instance: the code rendered under `theme` at `width` pixels
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    pub theme: String,
    pub width: u32,
}

/// Build one frame per (width, theme) combination
///
/// Widths are the outer loop and themes the inner one, so frames of the same
/// width sit next to each other. Duplicated inputs produce duplicated frames.
pub fn frame_matrix<S: AsRef<str>>(widths: &[u32], theme_names: &[S]) -> Vec<Frame> {
    widths
        .iter()
        .flat_map(|&width| {
            theme_names.iter().map(move |theme| Frame {
                theme: theme.as_ref().to_string(),
                width,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(theme: &str, width: u32) -> Frame {
        Frame {
            theme: theme.to_string(),
            width,
        }
    }

    #[test]
    fn test_widths_outer_themes_inner() {
        let frames = frame_matrix(&[320, 768], &["light", "dark"]);
        assert_eq!(
            frames,
            vec![
                frame("light", 320),
                frame("dark", 320),
                frame("light", 768),
                frame("dark", 768),
            ]
        );
    }

    #[test]
    fn test_size_is_product() {
        let themes = ["a", "b", "c"];
        let frames = frame_matrix(&[1, 2, 3, 4], &themes);
        assert_eq!(frames.len(), 12);

        let unique: std::collections::HashSet<_> = frames.iter().collect();
        assert_eq!(unique.len(), 12);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(frame_matrix::<&str>(&[], &["light"]).is_empty());
        assert!(frame_matrix::<&str>(&[320], &[]).is_empty());
    }

    #[test]
    fn test_stable_order() {
        let a = frame_matrix(&[1024, 320], &["dark", "light"]);
        let b = frame_matrix(&[1024, 320], &["dark", "light"]);
        assert_eq!(a, b);
        assert_eq!(a[0], frame("dark", 1024));
    }
}

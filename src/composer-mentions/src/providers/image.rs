//! Image mentions, a filtered view of the file index.

use async_trait::async_trait;
use composer_protocol::{MentionRef, MentionSuggestion, MentionType};

use super::{FileProvider, MentionContext, MentionProvider, mention_id};

/// Extensions recognized as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

/// Returns true if the path ends with an image extension (case-insensitive).
pub fn is_image_path(path: &str) -> bool {
    path.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty()
            && !ext.contains('/')
            && IMAGE_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
    })
}

/// Suggests and resolves image files.
#[derive(Debug, Clone)]
pub struct ImageProvider {
    files: FileProvider,
}

impl ImageProvider {
    pub fn new(files: FileProvider) -> Self {
        Self { files }
    }
}

#[async_trait]
impl MentionProvider for ImageProvider {
    fn kind(&self) -> MentionType {
        MentionType::Image
    }

    async fn suggest(&self, ctx: &MentionContext) -> Vec<MentionSuggestion> {
        self.files
            .suggest_filtered(ctx, MentionType::Image, is_image_path)
            .await
    }

    async fn resolve(&self, ctx: &MentionContext) -> Option<MentionRef> {
        let mut mention = self.files.resolve(ctx).await?;
        let relative_path = mention.relative_path.as_deref()?;
        if !is_image_path(relative_path) {
            return None;
        }

        mention.id = mention_id(MentionType::Image, relative_path);
        mention.mention_type = MentionType::Image;
        Some(mention)
    }
}

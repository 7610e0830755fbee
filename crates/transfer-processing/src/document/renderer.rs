//! Document renderer - section mapping + attachment list to PDF

use pdf_writer::{Filter, Finish, Name, Pdf, Rect, Ref};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use transfer_core::{AppError, DocumentSections, RenderedDocument, UploadedFile};

use super::layout::{Layout, LOGO_RESOURCE, PAGE_HEIGHT, PAGE_WIDTH};
use super::logo::LogoImage;
use super::metrics::{Font, MM};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to load logo {path}: {source}")]
    Logo {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid output path: {0}")]
    InvalidPath(PathBuf),
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Rendering(err.to_string())
    }
}

/// Renders transfer documents. Holds only immutable assets, so one instance is shared
/// by every session.
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    logo: Option<LogoImage>,
}

impl DocumentRenderer {
    pub fn new(logo: Option<LogoImage>) -> Self {
        Self { logo }
    }

    /// Load the header logo from disk when a path is configured.
    pub fn from_logo_path(path: Option<&Path>) -> Result<Self, RenderError> {
        let logo = path.map(LogoImage::load).transpose()?;
        if let Some(path) = path {
            tracing::info!(path = %path.display(), "PDF header logo loaded");
        }
        Ok(Self::new(logo))
    }

    /// Produce PDF bytes and the page count. Pure: equal inputs give equal bytes.
    pub fn render_bytes(
        &self,
        sections: &DocumentSections,
        attachments: &[UploadedFile],
    ) -> (Vec<u8>, usize) {
        let mut layout = Layout::new(self.logo.as_ref());
        for (title, rows) in sections.iter() {
            layout.section_title(title);
            for (label, value) in rows {
                layout.field(label, value);
            }
            layout.gap(2.0);
        }
        layout.attachments(attachments);
        let pages = layout.finish();
        let page_count = pages.len();

        let mut alloc = Ref::new(1);
        let catalog_id = alloc.bump();
        let tree_id = alloc.bump();
        let regular_id = alloc.bump();
        let bold_id = alloc.bump();
        let image_id = alloc.bump();
        let mask_id = alloc.bump();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(tree_id);

        let page_ids: Vec<(Ref, Ref)> = pages.iter().map(|_| (alloc.bump(), alloc.bump())).collect();
        pdf.pages(tree_id)
            .kids(page_ids.iter().map(|(page_id, _)| *page_id))
            .count(page_count as i32);

        for ((page_id, content_id), content) in page_ids.iter().zip(&pages) {
            let mut page = pdf.page(*page_id);
            page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH * MM, PAGE_HEIGHT * MM));
            page.parent(tree_id);
            page.contents(*content_id);
            let mut resources = page.resources();
            resources
                .fonts()
                .pair(Name(Font::Regular.resource_name()), regular_id)
                .pair(Name(Font::Bold.resource_name()), bold_id);
            if self.logo.is_some() {
                resources.x_objects().pair(Name(LOGO_RESOURCE), image_id);
            }
            resources.finish();
            page.finish();

            pdf.stream(*content_id, content);
        }

        for (id, font) in [(regular_id, Font::Regular), (bold_id, Font::Bold)] {
            pdf.type1_font(id)
                .base_font(Name(font.base_font()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        if let Some(logo) = &self.logo {
            let mut image = pdf.image_xobject(image_id, logo.rgb_data());
            image.filter(Filter::FlateDecode);
            image.width(logo.width() as i32);
            image.height(logo.height() as i32);
            image.color_space().device_rgb();
            image.bits_per_component(8);
            if logo.alpha_data().is_some() {
                image.s_mask(mask_id);
            }
            image.finish();

            if let Some(alpha) = logo.alpha_data() {
                let mut mask = pdf.image_xobject(mask_id, alpha);
                mask.filter(Filter::FlateDecode);
                mask.width(logo.width() as i32);
                mask.height(logo.height() as i32);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
                mask.finish();
            }
        }

        (pdf.finish(), page_count)
    }

    /// Render and write the document to `path`. The file appears under its final name
    /// only once it has been written completely.
    pub fn render(
        &self,
        sections: &DocumentSections,
        attachments: &[UploadedFile],
        path: &Path,
    ) -> Result<RenderedDocument, RenderError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| RenderError::InvalidPath(path.to_path_buf()))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let (bytes, page_count) = self.render_bytes(sections, attachments);

        let write_err = |source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        };
        std::fs::create_dir_all(dir).map_err(write_err)?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&bytes).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;

        tracing::debug!(
            file = %file_name,
            pages = page_count,
            size = bytes.len(),
            attachments = attachments.len(),
            "Document rendered"
        );

        Ok(RenderedDocument::new(file_name, path, bytes, page_count))
    }
}

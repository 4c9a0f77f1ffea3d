use anyhow::{anyhow, Result};
use clipboard_rs::common::{RustImage, RustImageData};
use clipboard_rs::{Clipboard, ClipboardContent, ClipboardContext, ContentFormat};
use tracing::debug;

use dc_core::content::{FileListPayload, ImagePayload, TextBundle};
use dc_core::ports::ClipboardPort;
use dc_core::ClipboardPayload;

/// System clipboard adapter.
///
/// Stateless: a fresh `ClipboardContext` per call, since the underlying
/// handle is not reliably shareable across threads on every platform.
pub struct SystemClipboard;

impl SystemClipboard {
    fn context() -> Result<ClipboardContext> {
        ClipboardContext::new().map_err(|e| anyhow!("create clipboard context failed: {e}"))
    }

    fn read_text_bundle(ctx: &ClipboardContext) -> TextBundle {
        let mut bundle = TextBundle::default();
        if ctx.has(ContentFormat::Text) {
            bundle.text = ctx.get_text().ok();
        }
        if ctx.has(ContentFormat::Html) {
            bundle.html = ctx.get_html().ok();
        }
        if ctx.has(ContentFormat::Rtf) {
            bundle.rtf = ctx.get_rich_text().ok();
        }
        bundle
    }
}

impl ClipboardPort for SystemClipboard {
    fn snapshot(&self) -> Result<Option<ClipboardPayload>> {
        let ctx = Self::context()?;

        // Files before image/text: macOS reports text/plain for file lists.
        if ctx.has(ContentFormat::Files) {
            let files = ctx
                .get_files()
                .map_err(|e| anyhow!("read clipboard files failed: {e}"))?;
            return Ok(Some(ClipboardPayload::Files(FileListPayload::new(files))));
        }

        if ctx.has(ContentFormat::Image) {
            let image = ctx
                .get_image()
                .map_err(|e| anyhow!("read clipboard image failed: {e}"))?;
            let png = image
                .to_png()
                .map_err(|e| anyhow!("convert clipboard image to PNG failed: {e}"))?;
            return Ok(Some(ClipboardPayload::Image(ImagePayload::from_png(
                png.get_bytes().to_vec(),
            ))));
        }

        if ctx.has(ContentFormat::Text)
            || ctx.has(ContentFormat::Html)
            || ctx.has(ContentFormat::Rtf)
        {
            return Ok(Some(ClipboardPayload::Text(Self::read_text_bundle(&ctx))));
        }

        let formats = ctx
            .available_formats()
            .map(|f| f.join(", "))
            .unwrap_or_default();
        debug!(%formats, "clipboard holds no supported format");
        Ok(None)
    }

    fn write(&self, payload: &ClipboardPayload) -> Result<()> {
        let ctx = Self::context()?;

        match payload {
            ClipboardPayload::Text(bundle) => {
                let mut contents = Vec::new();
                if let Some(text) = &bundle.text {
                    contents.push(ClipboardContent::Text(text.clone()));
                }
                if let Some(html) = &bundle.html {
                    contents.push(ClipboardContent::Html(html.clone()));
                }
                if let Some(rtf) = &bundle.rtf {
                    contents.push(ClipboardContent::Rtf(rtf.clone()));
                }
                ctx.set(contents)
                    .map_err(|e| anyhow!("set clipboard text failed: {e}"))
            }
            ClipboardPayload::Image(image) => {
                let data = RustImageData::from_bytes(&image.png)
                    .map_err(|e| anyhow!("decode PNG for clipboard failed: {e}"))?;
                ctx.set_image(data)
                    .map_err(|e| anyhow!("set clipboard image failed: {e}"))
            }
            ClipboardPayload::Files(list) => ctx
                .set_files(list.paths.clone())
                .map_err(|e| anyhow!("set clipboard files failed: {e}")),
        }
    }
}

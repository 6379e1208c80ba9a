use anyhow::{bail, Result};

use fluency::video::{check_tools, GlyphFont};
use fluency::FluencyConfig;

pub async fn cmd_check(config: &FluencyConfig) -> Result<()> {
    eprintln!("🔍 Checking dependencies...");

    let tools = check_tools(&config.encoder).await;
    let mark = |ok: bool| if ok { "✅" } else { "❌" };

    eprintln!("   {} ffmpeg  ({})", mark(tools.ffmpeg), config.encoder.ffmpeg_path);
    eprintln!("   {} ffprobe ({})", mark(tools.ffprobe), config.encoder.ffprobe_path);

    let font = GlyphFont::discover(config.canvas.font_path.as_deref());
    match &font {
        Ok(font) => eprintln!("   ✅ font    ({})", font.source().display()),
        Err(e) => eprintln!("   ❌ font    ({e})"),
    }

    if !tools.all_available() || font.is_err() {
        bail!("missing dependencies for video rendering");
    }

    eprintln!("\n✅ Ready to render");
    Ok(())
}

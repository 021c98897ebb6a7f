use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tiny_skia::{FilterQuality, IntSize, Pixmap, PixmapPaint, Transform};
use ultex_experiment::Screen;

/// Image file for a screen, relative to the assets directory.
pub fn screen_file(screen: Screen) -> String {
    match screen {
        Screen::Welcome => "r001.jpg".to_string(),
        Screen::Instruction(n) => format!("i00{n}.jpg"),
        Screen::BaselineNotice => "b001.jpg".to_string(),
        Screen::Fixation => "f001.jpg".to_string(),
        Screen::Neutral => "em003.jpg".to_string(),
        Screen::Emotion(id) => format!("em00{id}.jpg"),
        Screen::DecisionPrompt => "d001.jpg".to_string(),
        Screen::RunBreak => "r002.jpg".to_string(),
        Screen::Finished => "r003.jpg".to_string(),
    }
}

/// All stimulus images, preloaded at startup and scaled to the window
/// on demand. A missing file fails the session before it begins.
pub struct ImageBank {
    sources: HashMap<Screen, Pixmap>,
    scaled: HashMap<Screen, Pixmap>,
    size: (u32, u32),
}

impl ImageBank {
    pub fn load(dir: &Path, emotion_ids: &[u32]) -> Result<Self> {
        let mut screens = vec![
            Screen::Welcome,
            Screen::BaselineNotice,
            Screen::Fixation,
            Screen::Neutral,
            Screen::DecisionPrompt,
            Screen::RunBreak,
            Screen::Finished,
        ];
        for n in 1..=5 {
            screens.push(Screen::Instruction(n));
        }
        for &id in emotion_ids {
            screens.push(Screen::Emotion(id));
        }

        let mut sources = HashMap::new();
        for screen in screens {
            let path = dir.join(screen_file(screen));
            let pixmap = load_pixmap(&path)
                .with_context(|| format!("failed to load stimulus image {}", path.display()))?;
            sources.insert(screen, pixmap);
        }
        Ok(Self {
            sources,
            scaled: HashMap::new(),
            size: (0, 0),
        })
    }

    /// The screen's image scaled to the window, cached per window size.
    pub fn scaled(&mut self, screen: Screen, width: u32, height: u32) -> Option<&Pixmap> {
        if self.size != (width, height) {
            self.scaled.clear();
            self.size = (width, height);
        }
        if !self.scaled.contains_key(&screen) {
            let src = self.sources.get(&screen)?;
            let mut target = Pixmap::new(width, height)?;
            let sx = width as f32 / src.width() as f32;
            let sy = height as f32 / src.height() as f32;
            let paint = PixmapPaint {
                quality: FilterQuality::Bilinear,
                ..PixmapPaint::default()
            };
            target.draw_pixmap(
                0,
                0,
                src.as_ref(),
                &paint,
                Transform::from_scale(sx, sy),
                None,
            );
            self.scaled.insert(screen, target);
        }
        self.scaled.get(&screen)
    }
}

fn load_pixmap(path: &Path) -> Result<Pixmap> {
    let image = image::open(path)?.into_rgba8();
    let (width, height) = image.dimensions();
    let mut data = image.into_raw();
    // tiny-skia pixmaps are premultiplied RGBA.
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a < 255 {
            px[0] = (px[0] as u16 * a / 255) as u8;
            px[1] = (px[1] as u16 * a / 255) as u8;
            px[2] = (px[2] as u16 * a / 255) as u8;
        }
    }
    let size = IntSize::from_wh(width, height).context("image has no pixels")?;
    Pixmap::from_vec(data, size).context("image does not fit in a pixmap")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_files_match_the_stimulus_set() {
        assert_eq!(screen_file(Screen::Welcome), "r001.jpg");
        assert_eq!(screen_file(Screen::Instruction(3)), "i003.jpg");
        assert_eq!(screen_file(Screen::Neutral), "em003.jpg");
        assert_eq!(screen_file(Screen::Emotion(1)), "em001.jpg");
        assert_eq!(screen_file(Screen::RunBreak), "r002.jpg");
        assert_eq!(screen_file(Screen::Finished), "r003.jpg");
    }
}

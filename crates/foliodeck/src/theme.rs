use eframe::egui::Color32;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub foreground: Color32,
    pub heading_color: Color32,
    pub accent: Color32,
    pub panel_background: Color32,
    /// Color mirrored into the window chrome when the theme is applied.
    pub chrome: Color32,
    pub h1_size: f32,
    pub h2_size: f32,
    pub body_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(0x0A, 0x0A, 0x0F),
            foreground: Color32::from_rgb(0xC8, 0xC8, 0xD4),
            heading_color: Color32::WHITE,
            accent: Color32::from_rgb(0x52, 0x94, 0xE2),
            panel_background: Color32::from_rgb(0x16, 0x16, 0x20),
            chrome: Color32::from_rgb(0x0A, 0x0A, 0x0F),
            h1_size: 96.0,
            h2_size: 52.0,
            body_size: 28.0,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::from_rgb(0xF0, 0xF2, 0xFF),
            foreground: Color32::from_rgb(0x1A, 0x1A, 0x2E),
            heading_color: Color32::from_rgb(0x16, 0x21, 0x3E),
            accent: Color32::from_rgb(0x0F, 0x34, 0x60),
            panel_background: Color32::WHITE,
            chrome: Color32::from_rgb(0xF0, 0xF2, 0xFF),
            h1_size: 96.0,
            h2_size: 52.0,
            body_size: 28.0,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::dark(),
            _ => Self::light(),
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "dark" {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (opacity * 255.0) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_name_defaults_to_light() {
        assert_eq!(Theme::from_name("sepia").name, "light");
    }

    #[test]
    fn toggling_flips_between_the_two_palettes() {
        let light = Theme::light();
        assert_eq!(light.toggled().name, "dark");
        assert_eq!(light.toggled().toggled().name, "light");
    }

    #[test]
    fn chrome_colors_match_the_palette() {
        assert_eq!(Theme::light().chrome, Color32::from_rgb(0xF0, 0xF2, 0xFF));
        assert_eq!(Theme::dark().chrome, Color32::from_rgb(0x0A, 0x0A, 0x0F));
    }
}

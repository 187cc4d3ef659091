use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, RichText, Stroke, TextStyle};

#[derive(Debug, Clone)]
pub struct Theme {
    pub surface_0: Color32,
    pub surface_1: Color32,
    pub surface_2: Color32,
    pub surface_3: Color32,
    pub brand_purple: Color32,
    pub brand_purple_hover: Color32,
    pub brand_purple_soft: Color32,
    pub brand_orange: Color32,
    pub success: Color32,
    pub danger: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub border_subtle: Color32,
    pub user_bubble: Color32,
    pub spacing_8: f32,
    pub spacing_12: f32,
    pub spacing_16: f32,
    pub radius_10: u8,
    pub radius_12: u8,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            surface_0: Color32::from_rgb(0x0B, 0x0A, 0x12),
            surface_1: Color32::from_rgb(0x12, 0x10, 0x1C),
            surface_2: Color32::from_rgb(0x1A, 0x17, 0x28),
            surface_3: Color32::from_rgb(0x24, 0x20, 0x36),
            brand_purple: Color32::from_rgb(0x7C, 0x3A, 0xED),
            brand_purple_hover: Color32::from_rgb(0x6D, 0x28, 0xD9),
            brand_purple_soft: Color32::from_rgb(0xC4, 0xB5, 0xFD),
            brand_orange: Color32::from_rgb(0xF9, 0x73, 0x16),
            success: Color32::from_rgb(0x34, 0xD3, 0x99),
            danger: Color32::from_rgb(0xF8, 0x71, 0x71),
            text_primary: Color32::from_rgb(0xF4, 0xF2, 0xFA),
            text_muted: Color32::from_rgb(0x9C, 0x96, 0xB0),
            border_subtle: Color32::from_rgba_premultiplied(255, 255, 255, 18),
            user_bubble: Color32::from_rgb(0x3B, 0x1F, 0x73),
            spacing_8: 8.0,
            spacing_12: 12.0,
            spacing_16: 16.0,
            radius_10: 10,
            radius_12: 12,
        }
    }
}

impl Theme {
    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = self.surface_1;
        visuals.extreme_bg_color = self.surface_0;
        visuals.override_text_color = Some(self.text_primary);
        visuals.widgets.noninteractive.bg_fill = self.surface_2;
        visuals.widgets.noninteractive.weak_bg_fill = self.surface_2;
        visuals.widgets.noninteractive.bg_stroke = Stroke::NONE;
        visuals.widgets.inactive.bg_fill = self.surface_2;
        visuals.widgets.inactive.weak_bg_fill = self.surface_3;
        visuals.widgets.inactive.bg_stroke = Stroke::NONE;
        visuals.widgets.hovered.bg_fill = self.surface_3;
        visuals.widgets.hovered.weak_bg_fill = self.brand_purple_hover;
        visuals.widgets.hovered.bg_stroke = Stroke::NONE;
        visuals.widgets.active.bg_fill = self.brand_purple;
        visuals.widgets.active.weak_bg_fill = self.brand_purple;
        visuals.widgets.active.bg_stroke = Stroke::NONE;
        visuals.selection.bg_fill = self.brand_purple;
        visuals.hyperlink_color = self.brand_purple_soft;
        visuals.window_fill = self.surface_1;
        visuals.window_stroke = Stroke::NONE;
        visuals.window_corner_radius = CornerRadius::same(self.radius_10);

        let mut style = (*ctx.style()).clone();
        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(10.0, 10.0);
        style.spacing.button_padding = egui::vec2(12.0, 8.0);
        style.text_styles.insert(TextStyle::Heading, FontId::proportional(20.0));
        style.text_styles.insert(TextStyle::Body, FontId::proportional(14.0));
        style.text_styles.insert(TextStyle::Monospace, FontId::monospace(12.0));
        style.text_styles.insert(TextStyle::Small, FontId::proportional(12.0));
        ctx.set_style(style);
    }

    pub fn panel_frame(&self, fill: Color32, inner_padding: i8) -> Frame {
        Frame::new()
            .fill(fill)
            .inner_margin(Margin::same(inner_padding))
            .corner_radius(CornerRadius::same(self.radius_12))
            .stroke(Stroke::new(1.0, self.border_subtle))
    }

    pub fn card_frame(&self) -> Frame {
        self.panel_frame(self.surface_2, self.spacing_12 as i8)
    }

    /// Cards get a purple outline when selected.
    pub fn selectable_card_frame(&self, selected: bool) -> Frame {
        let frame = self.card_frame();
        if selected {
            frame.stroke(Stroke::new(2.0, self.brand_purple))
        } else {
            frame
        }
    }

    pub fn bubble_frame(&self, from_user: bool) -> Frame {
        let fill = if from_user { self.user_bubble } else { self.surface_2 };
        Frame::new()
            .fill(fill)
            .inner_margin(Margin::symmetric(self.spacing_12 as i8, 8))
            .corner_radius(CornerRadius::same(self.radius_12))
    }

    pub fn primary_button(&self, label: &str) -> egui::Button<'static> {
        egui::Button::new(RichText::new(label.to_string()).color(Color32::WHITE).strong())
            .fill(self.brand_purple)
            .corner_radius(CornerRadius::same(self.radius_10))
    }

    pub fn badge(&self, label: &str, color: Color32) -> RichText {
        RichText::new(label.to_uppercase()).small().strong().color(color)
    }

    pub fn status_color(&self, ok: bool) -> Color32 {
        if ok {
            self.success
        } else {
            self.danger
        }
    }
}

//! The nameplate input form

use gtk4::prelude::*;
use gtk4::{Box as GtkBox, CheckButton, DropDown, Entry, Label, Orientation};
use nameplate_core::constants::{FRAME_COLORS, PASS_COLORS, RANK_TIERS};
use nameplate_core::{FormInput, InputSource, PlateType};

fn labelled_row(label: &str, widget: &impl IsA<gtk4::Widget>) -> GtkBox {
    let row = GtkBox::new(Orientation::Horizontal, 8);
    let label = Label::new(Some(label));
    label.set_width_chars(10);
    label.set_xalign(0.0);
    row.append(&label);
    widget.set_hexpand(true);
    row.append(widget);
    row
}

fn selected<'a>(dropdown: &DropDown, options: &[&'a str]) -> &'a str {
    options.get(dropdown.selected() as usize).copied().unwrap_or_default()
}

/// Entries and pickers mirroring `FormInput`
pub struct PlateForm {
    root: GtkBox,
    title: Entry,
    player_name: Entry,
    plate_type: DropDown,
    show_rank: CheckButton,
    rank_tier: DropDown,
    frame_color: DropDown,
    pass_color: DropDown,
}

impl Default for PlateForm {
    fn default() -> Self {
        Self::new()
    }
}

impl PlateForm {
    pub fn new() -> Self {
        let title = Entry::builder().placeholder_text("称号").build();
        let player_name = Entry::builder().placeholder_text("プレイヤー名").build();
        let type_keys: Vec<&str> = PlateType::ALL.iter().map(|t| t.key()).collect();
        let plate_type = DropDown::from_strings(&type_keys);
        let show_rank = CheckButton::with_label("段位を表示");

        let rank_tier = DropDown::from_strings(&RANK_TIERS);
        let frame_color = DropDown::from_strings(&FRAME_COLORS);
        let pass_color = DropDown::from_strings(&PASS_COLORS);

        let rank_options = GtkBox::new(Orientation::Vertical, 4);
        rank_options.append(&labelled_row("段位", &rank_tier));
        rank_options.append(&labelled_row("枠の色", &frame_color));
        rank_options.append(&labelled_row("合格の色", &pass_color));
        rank_options.set_visible(false);

        let rank_box = rank_options.clone();
        show_rank.connect_toggled(move |check| rank_box.set_visible(check.is_active()));

        let root = GtkBox::new(Orientation::Vertical, 6);
        root.append(&labelled_row("称号", &title));
        root.append(&labelled_row("名前", &player_name));
        root.append(&labelled_row("プレート", &plate_type));
        root.append(&show_rank);
        root.append(&rank_options);

        PlateForm {
            root,
            title,
            player_name,
            plate_type,
            show_rank,
            rank_tier,
            frame_color,
            pass_color,
        }
    }

    pub fn widget(&self) -> &GtkBox {
        &self.root
    }

    /// Call `f` after any field changes
    pub fn connect_changed<F: Fn() + Clone + 'static>(&self, f: F) {
        for entry in [&self.title, &self.player_name] {
            let f = f.clone();
            entry.connect_changed(move |_| f());
        }
        for dropdown in [&self.plate_type, &self.rank_tier, &self.frame_color, &self.pass_color] {
            let f = f.clone();
            dropdown.connect_selected_notify(move |_| f());
        }
        self.show_rank.connect_toggled(move |_| f());
    }
}

impl InputSource for PlateForm {
    fn read(&self) -> FormInput {
        let plate_type = PlateType::ALL
            .get(self.plate_type.selected() as usize)
            .copied()
            .unwrap_or_default();
        FormInput {
            title: self.title.text().to_string(),
            player_name: self.player_name.text().to_string(),
            plate_type,
            show_rank: self.show_rank.is_active(),
            rank_tier: selected(&self.rank_tier, &RANK_TIERS).to_string(),
            frame_color: selected(&self.frame_color, &FRAME_COLORS).to_string(),
            pass_color: selected(&self.pass_color, &PASS_COLORS).to_string(),
        }
    }
}

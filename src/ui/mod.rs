pub mod widget;

pub use widget::MapView;

use crate::widget::{surface::HeadlessBackend, MapWidget};

pub trait UiMapExt {
    fn map_widget(&mut self, widget: &mut MapWidget<HeadlessBackend>) -> egui::Response;
}

impl UiMapExt for egui::Ui {
    fn map_widget(&mut self, widget: &mut MapWidget<HeadlessBackend>) -> egui::Response {
        self.add(MapView::new(widget))
    }
}

use crossbeam_channel::{Receiver, Sender};
use parcelmap::{
    prelude::*,
    runtime,
    widget::{SlotSelection, TargetSlot},
};

/// Pickup/dropoff picker demo
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    parcelmap::init_logging();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("parcelmap - pickup & dropoff"),
        ..Default::default()
    };

    eframe::run_native(
        "parcelmap-app",
        options,
        Box::new(|cc| Box::new(ParcelApp::new(cc))),
    )
    .map_err(|e| anyhow::anyhow!("eframe failed: {e}"))?;

    Ok(())
}

/// Where "Use my location" lands on a desktop without location services
const DEMO_POSITION: LatLng = LatLng {
    lat: 28.6315,
    lng: 77.2167,
};

struct ParcelApp {
    widget: MapWidget,
    forms: [FormAddress; 2],
    active: TargetSlot,
    updates: Receiver<LocationUpdate>,
    errors_tx: Sender<String>,
    errors: Receiver<String>,
    last_error: Option<String>,
}

impl ParcelApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let geocode = GeocodeConfig::default();
        let geocoder: Arc<dyn GeocodeService> = match GatewayGeocoder::new(&geocode) {
            Ok(geocoder) => Arc::new(geocoder),
            Err(e) => {
                log::error!("could not build gateway client, geocoding disabled: {e}");
                Arc::new(Offline)
            }
        };

        let widget = MapWidget::headless(
            geocoder,
            WidgetConfig::default().with_labels(SlotLabels::pickup_dropoff()),
            &geocode,
        );

        let (updates_tx, updates) = crossbeam_channel::unbounded();
        let ctx = cc.egui_ctx.clone();
        widget.on_location_resolved(move |update| {
            let _ = updates_tx.send(update);
            ctx.request_repaint();
        });

        let (errors_tx, errors) = crossbeam_channel::unbounded();
        Self {
            widget,
            forms: [FormAddress::default(), FormAddress::default()],
            active: TargetSlot::A,
            updates,
            errors_tx,
            errors,
            last_error: None,
        }
    }

    fn drain_events(&mut self) {
        while let Ok(update) = self.updates.try_recv() {
            log::info!("{:?} resolved at {}", update.slot, update.coordinate);
            self.forms[update.slot.index()].apply(&update);
        }
        while let Ok(error) = self.errors.try_recv() {
            self.last_error = Some(error);
        }
    }

    fn props(&self) -> WidgetProps {
        WidgetProps {
            active_slot: self.active,
            coordinate_a: self.forms[0].coordinate(),
            coordinate_b: self.forms[1].coordinate(),
        }
    }

    fn spawn_locate<F>(&self, ctx: &egui::Context, locate: F)
    where
        F: Future<Output = std::result::Result<LocationUpdate, LocateError>> + Send + 'static,
    {
        let errors = self.errors_tx.clone();
        let ctx = ctx.clone();
        runtime::spawn(async move {
            if let Err(e) = locate.await {
                let _ = errors.send(e.to_string());
                ctx.request_repaint();
            }
        });
    }

    fn slot_panel(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, slot: TargetSlot) {
        let label = self.widget.label(slot).to_string();
        ui.heading(&label);

        ui.horizontal(|ui| {
            ui.radio_value(&mut self.active, slot, "Set on map");
            if ui.button("Use my location").clicked() {
                self.active = slot;
                let provider: Arc<dyn PositionProvider> = Arc::new(FixedPosition(DEMO_POSITION));
                self.spawn_locate(ctx, self.widget.locate(slot, provider));
            }
            if ui.button("Clear").clicked() {
                if let Err(e) = self.widget.clear(SlotSelection::Slot(slot)) {
                    log::warn!("clear failed: {e}");
                }
                self.forms[slot.index()].clear();
            }
        });

        let search = self.widget.search(slot).clone();
        let mut text = search.text();
        if ui
            .add(egui::TextEdit::singleline(&mut text).hint_text("Search address"))
            .changed()
        {
            search.input(text);
        }
        for place in search.candidates() {
            if ui.selectable_label(false, &place.display_name).clicked() {
                self.active = slot;
                search.select(&place);
            }
        }

        let form = &mut self.forms[slot.index()];
        egui::Grid::new(("address", slot.index())).show(ui, |ui| {
            for (name, value) in [
                ("Address", &mut form.addr1),
                ("Line 2", &mut form.addr2),
                ("City", &mut form.city),
                ("State", &mut form.state),
                ("Postal", &mut form.postal),
            ] {
                ui.label(name);
                ui.text_edit_singleline(value);
                ui.end_row();
            }
        });
        if let Some(at) = form.coordinate() {
            ui.weak(format!("{at}"));
        }
        ui.separator();
    }
}

impl eframe::App for ParcelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        if let Err(e) = self.widget.render(self.props()) {
            log::error!("map render failed: {e}");
        }

        egui::SidePanel::left("addresses")
            .default_width(360.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    for intent in [Intent::Send, Intent::Receive] {
                        if ui.button(format!("{intent:?}")).clicked() {
                            let other = intent.slot().other();
                            self.forms[other.index()].clear();
                            self.active = intent.slot();
                            let provider: Arc<dyn PositionProvider> =
                                Arc::new(FixedPosition(DEMO_POSITION));
                            let locate = self.widget.apply_intent(intent, provider);
                            self.spawn_locate(ctx, locate);
                        }
                    }
                });
                ui.separator();

                self.slot_panel(ui, ctx, TargetSlot::A);
                self.slot_panel(ui, ctx, TargetSlot::B);

                if let Some(meters) = self.widget.markers().route_distance_m() {
                    ui.label(format!("Straight-line distance: {:.1} km", meters / 1000.0));
                }
                if let Some(error) = &self.last_error {
                    ui.colored_label(egui::Color32::RED, error);
                }
                let ready = self.forms.iter().all(FormAddress::is_submittable);
                ui.add_enabled(ready, egui::Button::new("Create order"));
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(self.widget.title());
            ui.weak(self.widget.hint());
            ui.add(MapView::new(&mut self.widget));
        });

        // Keep polling while searches or lookups may still land
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

/// Stand-in when the gateway client cannot be built
struct Offline;

#[async_trait::async_trait]
impl GeocodeService for Offline {
    async fn reverse(&self, _at: LatLng) -> std::result::Result<Place, GeocodeError> {
        Err(GeocodeError::NotFound)
    }

    async fn forward(
        &self,
        _query: &str,
        _limit: usize,
    ) -> std::result::Result<Vec<Place>, GeocodeError> {
        Ok(Vec::new())
    }
}

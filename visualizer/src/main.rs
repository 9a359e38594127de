use forms::{Field, Forms, SHIP_TYPE_GROUPS};
use iced::{
    widget::{
        button, column, row, scrollable, text, text_input, Button, Canvas, Column, Container, Row,
        TextInput,
    },
    Alignment, Element, Length, Subscription, Task, Theme,
};
use log::{info, warn};
use map::{MapScene, Projection};
use navmapcore::ais::ShipRegistry;
use navmapcore::command::MapCommand;
use navmapcore::export;
use navmapcore::markers::model::{Marker, MarkerDraft, Severity};
use navmapcore::news::{NewsEvent, NewsReport};
use navmapcore::state::{AppState, AppliedCommand};
use navmapcore::tracking::ZoneTracker;
use navmapcore::voyage::RoutePlan;
use relay::RelayEvent;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

mod client;
mod forms;
mod map;
mod relay;

const STATE_PATH_ENV: &str = "NAVMAP_STATE";
const DEFAULT_STATE_PATH: &str = "tools/data/navmap_state.json";
const HISTORY_LIMIT: usize = 20;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Console::boot, Console::update, Console::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Console) -> String {
    "NavMap Console".into()
}

fn application_subscription(_: &Console) -> Subscription<Message> {
    Subscription::run(relay::connect).map(Message::Relay)
}

fn application_theme(_: &Console) -> Theme {
    Theme::Dark
}

#[derive(Debug, Clone, Copy)]
enum ExportFormat {
    GeoJson,
    Csv,
    Kml,
}

#[derive(Debug, Clone)]
enum Message {
    Relay(RelayEvent),
    FieldChanged(Field, String),
    CycleSeverity,
    ToggleShipGroup(u32),
    ToggleMarkerType(String),
    ToggleMarkerSeverity(Severity),
    AddCustomIcon,
    UseIcon(String),
    SaveMapboxToken,
    SaveMarker,
    EditMarker(u64),
    DeleteMarker(u64),
    ApplyZone,
    ToggleTracking,
    DismissAlert(u64),
    Zoom(f64),
    CenterOnZone,
    PlanRoute,
    SaveVoyage,
    LoadVoyage(String),
    DeleteVoyage(String),
    SendChat,
    ChatReplied(Result<MapCommand, String>),
    SearchNews,
    NewsReceived(Result<NewsReport, String>),
    Export(ExportFormat),
}

struct Console {
    app: AppState,
    state_path: PathBuf,
    gateway: String,
    forms: Forms,
    ships: ShipRegistry,
    tracker: ZoneTracker,
    in_zone: HashSet<u64>,
    plan: Option<RoutePlan>,
    news: Vec<NewsEvent>,
    chat_log: Vec<String>,
    chat_pending: bool,
    relay_status: String,
    status: String,
    history: Vec<String>,
}

impl Console {
    fn boot() -> (Self, Task<Message>) {
        let state_path = std::env::var(STATE_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH));
        let (app, status) = match AppState::load(&state_path) {
            Ok(app) => {
                let status = format!("Loaded {} markers", app.markers.len());
                (app, status)
            }
            Err(err) => {
                warn!("could not load {}: {}", state_path.display(), err);
                (
                    AppState::default(),
                    format!("State file unreadable, starting fresh: {err}"),
                )
            }
        };
        let mut forms = Forms::new(&app.zone);
        forms.mapbox_token = app.mapbox_token.clone().unwrap_or_default();
        (
            Console {
                app,
                state_path,
                gateway: client::gateway_url(),
                forms,
                ships: ShipRegistry::new(),
                tracker: ZoneTracker::new(),
                in_zone: HashSet::new(),
                plan: None,
                news: Vec::new(),
                chat_log: Vec::new(),
                chat_pending: false,
                relay_status: "Connecting to relay...".into(),
                status,
                history: Vec::new(),
            },
            Task::none(),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Relay(event) => {
                state.on_relay(event);
                Task::none()
            }
            Message::FieldChanged(field, value) => {
                state.forms.update_field(field, value);
                if matches!(field, Field::MinSpeed | Field::MaxSpeed) {
                    state.evaluate_zone();
                }
                Task::none()
            }
            Message::ToggleShipGroup(first_code) => {
                state.forms.toggle_ship_group(first_code);
                state.evaluate_zone();
                Task::none()
            }
            Message::ToggleMarkerType(kind) => {
                state.forms.toggle_marker_type(&kind);
                Task::none()
            }
            Message::ToggleMarkerSeverity(severity) => {
                state.forms.toggle_marker_severity(severity);
                Task::none()
            }
            Message::AddCustomIcon => {
                match state.forms.custom_icon() {
                    Ok(icon) => {
                        state.push_history(format!("Custom icon {} saved", icon.label));
                        state.app.add_custom_icon(icon);
                        state.forms.clear_icon();
                        state.persist();
                    }
                    Err(err) => state.status = format!("Icon error: {err}"),
                }
                Task::none()
            }
            Message::UseIcon(id) => {
                state.forms.marker_icon = id;
                Task::none()
            }
            Message::SaveMapboxToken => {
                state.app.set_mapbox_token(&state.forms.mapbox_token);
                state.status = format!("Base map: {}", state.app.tile_attribution());
                state.persist();
                Task::none()
            }
            Message::CycleSeverity => {
                state.forms.cycle_severity();
                Task::none()
            }
            Message::SaveMarker => {
                state.save_marker();
                Task::none()
            }
            Message::EditMarker(id) => {
                if let Some(marker) = state.app.markers.get(id) {
                    let draft = MarkerDraft::from(marker);
                    state.forms.load_marker(id, &draft);
                }
                Task::none()
            }
            Message::DeleteMarker(id) => {
                match state.app.delete_marker(id) {
                    Ok(marker) => {
                        state.push_history(format!("Deleted marker {}", marker.name));
                        if state.forms.editing == Some(id) {
                            state.forms.clear_marker();
                        }
                        state.persist();
                    }
                    Err(err) => state.status = err.to_string(),
                }
                Task::none()
            }
            Message::ApplyZone => {
                match state.forms.zone().and_then(|zone| {
                    state.app.set_zone(zone).map_err(|err| err.to_string())
                }) {
                    Ok(()) => {
                        state.status = format!(
                            "Operation zone set: {:.1} km radius",
                            state.app.zone.radius_m / 1000.0
                        );
                        state.persist();
                        state.evaluate_zone();
                    }
                    Err(err) => state.status = format!("Zone error: {err}"),
                }
                Task::none()
            }
            Message::ToggleTracking => {
                if state.tracker.is_active() {
                    state.tracker.stop();
                    state.in_zone.clear();
                    state.push_history("Zone tracking stopped".into());
                } else {
                    state.tracker.start();
                    state.push_history("Zone tracking started".into());
                    state.evaluate_zone();
                }
                Task::none()
            }
            Message::DismissAlert(mmsi) => {
                state.tracker.dismiss(mmsi);
                Task::none()
            }
            Message::Zoom(delta) => {
                let mut view = state.app.view;
                view.zoom = (view.zoom + delta).clamp(2.0, 16.0);
                if state.app.set_view(view).is_ok() {
                    state.persist();
                }
                Task::none()
            }
            Message::CenterOnZone => {
                let mut view = state.app.view;
                view.lat = state.app.zone.center.lat;
                view.lng = state.app.zone.center.lon;
                if state.app.set_view(view).is_ok() {
                    state.persist();
                }
                Task::none()
            }
            Message::PlanRoute => {
                match state.forms.route() {
                    Ok(plan) => {
                        state.status = format!(
                            "Route: {:.1} km, bearing {:.0}°, ETA {}",
                            plan.distance_km, plan.bearing_deg, plan.eta
                        );
                        state.plan = Some(plan);
                    }
                    Err(err) => state.status = format!("Route error: {err}"),
                }
                Task::none()
            }
            Message::SaveVoyage => {
                match state.plan.map(|plan| state.app.record_voyage(&plan)) {
                    Some(Ok(voyage)) => {
                        state.push_history(format!(
                            "Voyage saved: {:.1} km, {}",
                            voyage.distance_km, voyage.duration
                        ));
                        state.persist();
                    }
                    Some(Err(err)) => state.status = format!("Voyage error: {err}"),
                    None => state.status = "Plan a route first".into(),
                }
                Task::none()
            }
            Message::LoadVoyage(id) => {
                match state.app.voyages.get(&id).map(|voyage| voyage.to_plan()) {
                    Some(Ok(plan)) => state.plan = Some(plan),
                    Some(Err(err)) => state.status = err.to_string(),
                    None => state.status = format!("Voyage {id} no longer exists"),
                }
                Task::none()
            }
            Message::DeleteVoyage(id) => {
                match state.app.delete_voyage(&id) {
                    Ok(()) => state.persist(),
                    Err(err) => state.status = err.to_string(),
                }
                Task::none()
            }
            Message::SendChat => {
                let message = state.forms.chat.trim().to_string();
                if message.is_empty() || state.chat_pending {
                    return Task::none();
                }
                state.chat_pending = true;
                state.chat_log.push(format!("You: {message}"));
                state.forms.chat.clear();
                Task::perform(
                    client::send_chat(
                        state.gateway.clone(),
                        message,
                        state.app.markers.as_slice().to_vec(),
                    ),
                    Message::ChatReplied,
                )
            }
            Message::ChatReplied(Ok(command)) => {
                state.chat_pending = false;
                state.apply_command(command);
                Task::none()
            }
            Message::ChatReplied(Err(err)) => {
                state.chat_pending = false;
                state.chat_log.push(format!("Assistant error: {err}"));
                Task::none()
            }
            Message::SearchNews => match state.forms.news_query() {
                Ok(query) => {
                    state.status = format!("Searching news for {:?}...", query.query);
                    Task::perform(
                        client::search_news(state.gateway.clone(), query),
                        Message::NewsReceived,
                    )
                }
                Err(err) => {
                    state.status = err;
                    Task::none()
                }
            },
            Message::NewsReceived(Ok(report)) => {
                state.status = format!("{} news events found", report.events.len());
                state.news = report.events;
                Task::none()
            }
            Message::NewsReceived(Err(err)) => {
                state.status = format!("News search failed: {err}");
                Task::none()
            }
            Message::Export(format) => {
                let dir = export_dir(&state.state_path);
                match write_export(&dir, format, state.app.markers.as_slice()) {
                    Ok(path) => state.status = format!("Exported to {}", path.display()),
                    Err(err) => state.status = format!("Export failed: {err}"),
                }
                Task::none()
            }
        }
    }

    fn on_relay(&mut self, event: RelayEvent) {
        match event {
            RelayEvent::Connected => {
                self.relay_status = "Relay connected".into();
                self.push_history("Relay connected".into());
            }
            RelayEvent::Ship(ship) => {
                self.ships.upsert(ship);
                if self.tracker.is_active() {
                    self.evaluate_zone();
                }
            }
            RelayEvent::Disconnected(reason) => {
                self.relay_status = format!("Relay disconnected ({reason}), retrying...");
            }
        }
    }

    fn evaluate_zone(&mut self) {
        if !self.tracker.is_active() {
            return;
        }
        let filter = self.forms.ship_filter();
        let evaluation = self
            .tracker
            .evaluate(&self.app.zone, self.ships.matching(&filter));
        self.in_zone = evaluation.members.iter().map(|ship| ship.mmsi).collect();
        for alert in evaluation.new_entries {
            self.push_history(format!("Zone entry: {}", alert.describe()));
        }
    }

    fn save_marker(&mut self) {
        let draft = match self.forms.marker_draft() {
            Ok(draft) => draft,
            Err(err) => {
                self.status = format!("Marker error: {err}");
                return;
            }
        };
        let result = match self.forms.editing {
            Some(id) => self.app.update_marker(id, draft).map(|marker| marker.name.clone()),
            None => self.app.add_marker(draft).map(|marker| marker.name.clone()),
        };
        match result {
            Ok(name) => {
                self.push_history(format!("Saved marker {name}"));
                self.forms.clear_marker();
                self.persist();
            }
            Err(err) => self.status = format!("Marker error: {err}"),
        }
    }

    fn apply_command(&mut self, command: MapCommand) {
        let reply = command.message().to_string();
        match self.app.apply_command(command) {
            Ok(applied) => {
                let summary = describe_applied(&applied);
                if !reply.is_empty() {
                    self.chat_log.push(format!("Assistant: {reply}"));
                }
                if let Some(summary) = summary {
                    self.push_history(summary);
                    self.persist();
                }
            }
            Err(err) => {
                self.chat_log
                    .push(format!("Assistant proposed an invalid change: {err}"));
            }
        }
    }

    fn persist(&mut self) {
        if let Err(err) = self.app.save(&self.state_path) {
            warn!("saving {} failed: {}", self.state_path.display(), err);
            self.status = format!("Could not save state: {err}");
        }
    }

    fn push_history(&mut self, entry: String) {
        self.status = entry.clone();
        self.history.push(entry);
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let filter = state.forms.marker_filter();
        let marker_rows = state.app.markers.filtered(&filter).into_iter().fold(
            Column::new().spacing(4),
            |col, marker| {
                col.push(
                    row![
                        text(format!(
                            "{} {} ({:.3}, {:.3}) [{}]",
                            state.app.icon_label(&marker.icon),
                            marker.name,
                            marker.lat,
                            marker.lng,
                            marker.severity
                        ))
                        .size(12)
                        .width(Length::Fill),
                        button("Edit").on_press(Message::EditMarker(marker.id)),
                        button("Delete").on_press(Message::DeleteMarker(marker.id)),
                    ]
                    .spacing(4)
                    .align_y(Alignment::Center),
                )
            },
        );

        let severity_toggles = [Severity::Low, Severity::Medium, Severity::High]
            .into_iter()
            .fold(Row::new().spacing(4), |row, severity| {
                row.push(toggle(
                    severity.to_string(),
                    state.forms.marker_severities.contains(&severity),
                    Message::ToggleMarkerSeverity(severity),
                ))
            });
        let mut kinds: Vec<&str> = state
            .app
            .markers
            .iter()
            .map(|marker| marker.kind.as_str())
            .collect();
        kinds.sort_unstable();
        kinds.dedup();
        let type_toggles = kinds
            .into_iter()
            .fold(Row::new().spacing(4), |row, kind| {
                row.push(toggle(
                    kind.to_string(),
                    state.forms.marker_types.iter().any(|selected| selected == kind),
                    Message::ToggleMarkerType(kind.to_string()),
                ))
            });

        let icon_rows = state.app.custom_icons.iter().fold(
            Column::new().spacing(4),
            |col, icon| {
                col.push(
                    row![
                        text(format!("{} ({})", icon.label, icon.data))
                            .size(12)
                            .width(Length::Fill),
                        button("Use").on_press(Message::UseIcon(icon.id.clone())),
                    ]
                    .spacing(4)
                    .align_y(Alignment::Center),
                )
            },
        );
        let icons_column = column![
            text("Custom icons").size(18),
            row![
                field("Label", &state.forms.icon_label, Field::IconLabel),
                field("Image path or data URL", &state.forms.icon_data, Field::IconData),
                button("Add icon").on_press(Message::AddCustomIcon),
            ]
            .spacing(6),
            icon_rows,
        ]
        .spacing(8);

        let save_label = if state.forms.editing.is_some() {
            "Update marker"
        } else {
            "Add marker"
        };
        let markers_column = column![
            text("Markers").size(22),
            field("Name", &state.forms.marker_name, Field::MarkerName),
            row![
                field("Type", &state.forms.marker_kind, Field::MarkerKind),
                field("Icon", &state.forms.marker_icon, Field::MarkerIcon),
            ]
            .spacing(6),
            field(
                "Description",
                &state.forms.marker_description,
                Field::MarkerDescription
            ),
            row![
                field("Latitude", &state.forms.marker_lat, Field::MarkerLat),
                field("Longitude", &state.forms.marker_lng, Field::MarkerLng),
            ]
            .spacing(6),
            row![
                button(text(format!("Severity: {}", state.forms.marker_severity)))
                    .on_press(Message::CycleSeverity),
                button(save_label).on_press(Message::SaveMarker),
            ]
            .spacing(6),
            field("Search markers", &state.forms.marker_search, Field::MarkerSearch),
            severity_toggles,
            type_toggles,
            scrollable(marker_rows).height(Length::Fixed(180.0)),
            row![
                button("GeoJSON").on_press(Message::Export(ExportFormat::GeoJson)),
                button("CSV").on_press(Message::Export(ExportFormat::Csv)),
                button("KML").on_press(Message::Export(ExportFormat::Kml)),
            ]
            .spacing(6),
        ]
        .spacing(8);

        let voyage_rows = state.app.voyages.iter().fold(
            Column::new().spacing(4),
            |col, voyage| {
                col.push(
                    row![
                        text(format!(
                            "{} {:.1} km, {}",
                            voyage.date.format("%Y-%m-%d %H:%M"),
                            voyage.distance_km,
                            voyage.duration
                        ))
                        .size(12)
                        .width(Length::Fill),
                        button("Show").on_press(Message::LoadVoyage(voyage.id.clone())),
                        button("Delete").on_press(Message::DeleteVoyage(voyage.id.clone())),
                    ]
                    .spacing(4)
                    .align_y(Alignment::Center),
                )
            },
        );

        let route_column = column![
            text("Route planner").size(22),
            row![
                field("From lat", &state.forms.route_from_lat, Field::RouteFromLat),
                field("From lon", &state.forms.route_from_lon, Field::RouteFromLon),
            ]
            .spacing(6),
            row![
                field("To lat", &state.forms.route_to_lat, Field::RouteToLat),
                field("To lon", &state.forms.route_to_lon, Field::RouteToLon),
            ]
            .spacing(6),
            field("Speed (kn)", &state.forms.route_speed, Field::RouteSpeed),
            row![
                button("Plan").on_press(Message::PlanRoute),
                button("Save voyage").on_press(Message::SaveVoyage),
            ]
            .spacing(6),
            voyage_rows,
        ]
        .spacing(8);

        let left = column![markers_column, icons_column, route_column]
            .spacing(18)
            .padding(16)
            .width(Length::Fixed(380.0));

        let ship_filter = state.forms.ship_filter();
        let ships = state.ships.filtered(&ship_filter);
        let scene = MapScene {
            projection: Projection::from_view(&state.app.view),
            zone: Some(state.app.zone),
            markers: state.app.markers.as_slice().to_vec(),
            ships: ships.clone(),
            in_zone: state.in_zone.clone(),
            route: state.plan.map(|plan| (plan.from, plan.to)),
            news: state.news.clone(),
        };
        let ship_groups = SHIP_TYPE_GROUPS.iter().fold(
            Row::new().spacing(4),
            |row, (label, first_code)| {
                row.push(toggle(
                    (*label).to_string(),
                    state.forms.ship_group_selected(*first_code),
                    Message::ToggleShipGroup(*first_code),
                ))
            },
        );
        let map_canvas = Canvas::new(scene)
            .width(Length::Fill)
            .height(Length::Fixed(460.0));

        let alerts = state.tracker.recent_alerts().fold(
            Column::new().spacing(4),
            |col, alert| {
                col.push(
                    row![
                        text(alert.describe()).size(12).width(Length::Fill),
                        button("Dismiss").on_press(Message::DismissAlert(alert.mmsi)),
                    ]
                    .spacing(4)
                    .align_y(Alignment::Center),
                )
            },
        );

        let tracking_label = if state.tracker.is_active() {
            "Stop tracking"
        } else {
            "Start tracking"
        };
        let center_column = column![
            text("Map").size(22),
            text(&state.relay_status).size(13),
            row![
                button("Zoom in").on_press(Message::Zoom(1.0)),
                button("Zoom out").on_press(Message::Zoom(-1.0)),
                button("Center on zone").on_press(Message::CenterOnZone),
                text(format!(
                    "{} ships shown / {} tracked, {} in zone",
                    ships.len(),
                    state.ships.len(),
                    state.in_zone.len()
                ))
                .size(13),
            ]
            .spacing(6)
            .align_y(Alignment::Center),
            map_canvas,
            text(format!("Tiles: {}", state.app.tile_attribution())).size(11),
            row![
                field("Min kn", &state.forms.min_speed, Field::MinSpeed),
                field("Max kn", &state.forms.max_speed, Field::MaxSpeed),
            ]
            .spacing(6),
            ship_groups,
            text("Operation zone").size(18),
            row![
                field("Center lat", &state.forms.zone_lat, Field::ZoneLat),
                field("Center lon", &state.forms.zone_lon, Field::ZoneLon),
                field("Radius km", &state.forms.zone_radius_km, Field::ZoneRadiusKm),
                button("Apply").on_press(Message::ApplyZone),
                button(tracking_label).on_press(Message::ToggleTracking),
            ]
            .spacing(6)
            .align_y(Alignment::Center),
            text("Zone alerts").size(16),
            alerts,
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let chat_entries = state
            .chat_log
            .iter()
            .fold(Column::new().spacing(4), |col, entry| {
                col.push(text(entry.clone()).size(13))
            });
        let news_entries = state
            .news
            .iter()
            .fold(Column::new().spacing(4), |col, event| {
                col.push(
                    text(format!(
                        "[{}] {} ({:.2}, {:.2}) {}",
                        event.severity, event.title, event.lat, event.lon, event.date
                    ))
                    .size(12),
                )
            });
        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let send = if state.chat_pending {
            button("Waiting...")
        } else {
            button("Send").on_press(Message::SendChat)
        };
        let right = column![
            text("Assistant").size(22),
            Container::new(scrollable(chat_entries).height(Length::Fixed(200.0))).padding(6),
            row![
                text_input("Ask the map assistant", &state.forms.chat)
                    .on_input(|value| Message::FieldChanged(Field::Chat, value))
                    .on_submit(Message::SendChat)
                    .padding(6),
                send,
            ]
            .spacing(6),
            text("News search").size(18),
            field("Query", &state.forms.news_query, Field::NewsQuery),
            row![
                field("Start date", &state.forms.news_start, Field::NewsStart),
                field("End date", &state.forms.news_end, Field::NewsEnd),
            ]
            .spacing(6),
            button("Search").on_press(Message::SearchNews),
            Container::new(scrollable(news_entries).height(Length::Fixed(140.0))).padding(6),
            text(&state.status).size(14),
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(160.0))).padding(6),
            text("Map settings").size(16),
            row![
                field("Mapbox token", &state.forms.mapbox_token, Field::MapboxToken),
                button("Save").on_press(Message::SaveMapboxToken),
            ]
            .spacing(6),
        ]
        .spacing(8)
        .padding(16)
        .width(Length::Fixed(380.0));

        let layout = row![left, center_column, right]
            .spacing(12)
            .align_y(Alignment::Start)
            .padding(12);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn field<'a>(placeholder: &str, value: &str, field: Field) -> TextInput<'a, Message> {
    text_input(placeholder, value)
        .on_input(move |value| Message::FieldChanged(field, value))
        .padding(6)
}

fn toggle<'a>(label: String, selected: bool, message: Message) -> Button<'a, Message> {
    let mark = if selected { "[x]" } else { "[ ]" };
    button(text(format!("{mark} {label}")).size(12)).on_press(message)
}

fn describe_applied(applied: &AppliedCommand) -> Option<String> {
    match applied {
        AppliedCommand::Added(marker) => Some(format!("Assistant added marker {}", marker.name)),
        AppliedCommand::Moved { id, to } => Some(format!(
            "Assistant moved marker {} to ({:.4}, {:.4})",
            id, to.lat, to.lon
        )),
        AppliedCommand::Batch { added, skipped } if skipped.is_empty() => {
            Some(format!("Assistant added {} markers", added.len()))
        }
        AppliedCommand::Batch { added, skipped } => Some(format!(
            "Assistant added {} markers, skipped {}: {}",
            added.len(),
            skipped.len(),
            skipped.join(", ")
        )),
        AppliedCommand::Message(_) => None,
    }
}

fn write_export(dir: &Path, format: ExportFormat, markers: &[Marker]) -> Result<PathBuf, String> {
    let (name, body) = match format {
        ExportFormat::GeoJson => (
            "markers.geojson",
            serde_json::to_string_pretty(&export::to_geojson(markers))
                .map_err(|err| err.to_string())?,
        ),
        ExportFormat::Csv => (
            "markers.csv",
            export::to_csv(markers).map_err(|err| err.to_string())?,
        ),
        ExportFormat::Kml => ("markers.kml", export::to_kml(markers)),
    };
    fs::create_dir_all(dir).map_err(|err| err.to_string())?;
    let path = dir.join(name);
    fs::write(&path, body).map_err(|err| err.to_string())?;
    info!("exported {} markers to {}", markers.len(), path.display());
    Ok(path)
}

fn export_dir(state_path: &Path) -> PathBuf {
    state_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(|parent| parent.join("exports"))
        .unwrap_or_else(|| PathBuf::from("exports"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use navmapcore::Coordinate;

    #[test]
    fn exports_land_next_to_the_state_file() {
        assert_eq!(
            export_dir(Path::new("tools/data/navmap_state.json")),
            PathBuf::from("tools/data/exports")
        );
        assert_eq!(export_dir(Path::new("state.json")), PathBuf::from("exports"));
    }

    #[test]
    fn applied_commands_are_summarised() {
        let marker = MarkerDraft::new("Port", "port", Coordinate::new(21.5, 39.1)).into_marker(3);
        assert_eq!(
            describe_applied(&AppliedCommand::Added(marker.clone())).as_deref(),
            Some("Assistant added marker Port")
        );
        assert_eq!(
            describe_applied(&AppliedCommand::Batch {
                added: vec![marker],
                skipped: vec!["Bad".into()],
            })
            .as_deref(),
            Some("Assistant added 1 markers, skipped 1: Bad")
        );
        assert_eq!(describe_applied(&AppliedCommand::Message("hi".into())), None);
    }

    #[test]
    fn exports_are_written_per_format() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");
        let markers =
            vec![MarkerDraft::new("Port", "port", Coordinate::new(21.5, 39.1)).into_marker(1)];

        let path = write_export(&target, ExportFormat::Kml, &markers).unwrap();
        assert_eq!(path, target.join("markers.kml"));
        assert!(fs::read_to_string(&path).unwrap().contains("<name>Port</name>"));

        let path = write_export(&target, ExportFormat::GeoJson, &markers).unwrap();
        let geojson: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(geojson["features"].as_array().map(Vec::len), Some(1));
    }
}

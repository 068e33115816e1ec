/*
[INPUT]:  Operator picks (survey, period, province, kabupaten) and backend lookups
[OUTPUT]: Live SelectionState snapshot via `watch`, with stale responses discarded
[POS]:    Engine layer - cascading selection graph
[UPDATE]: When adding a selection level or changing what a pick invalidates
[UPDATE]: 2026-10-15 Gate every async follow-up on a per-slot generation ticket
*/

use std::sync::Arc;

use fasih_sm_adapter::{Period, RegionOption, Survey, WilayahKey};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::backend::ConsoleBackend;
use crate::notice::{NoticeBoard, NoticeKind};
use crate::region::RegionResolver;
use crate::task::ActionContext;
use crate::wilayah::{WilayahOrchestrator, WilayahStatus};

/// Invalidation unit. Resetting a slot clears the fields it owns and bumps its generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Survey,
    Period,
    Province,
    Kabupaten,
    Wilayah,
}

impl Slot {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        match self {
            Slot::Survey => 0,
            Slot::Period => 1,
            Slot::Province => 2,
            Slot::Kabupaten => 3,
            Slot::Wilayah => 4,
        }
    }

    fn clear(self, state: &mut SelectionState) {
        match self {
            Slot::Survey => {
                state.survey_id = None;
                state.survey_name.clear();
                state.period_options.clear();
                state.region_group_id = None;
                state.template_id = None;
                state.province_options.clear();
            }
            Slot::Period => {
                state.period_id = None;
                state.period_name.clear();
                state.role.clear();
            }
            Slot::Province => {
                state.province_code = None;
                state.province_name.clear();
                state.kabupaten_options.clear();
            }
            Slot::Kabupaten => {
                state.kabupaten_id = None;
                state.kabupaten_name.clear();
            }
            Slot::Wilayah => state.wilayah = WilayahStatus::idle(),
        }
    }
}

/// A pick made by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Survey,
    Period,
    Province,
    Kabupaten,
}

impl Selection {
    /// Slots invalidated by this pick, top-down
    pub fn resets(self) -> &'static [Slot] {
        match self {
            Selection::Survey => &[
                Slot::Survey,
                Slot::Period,
                Slot::Province,
                Slot::Kabupaten,
                Slot::Wilayah,
            ],
            Selection::Period => &[Slot::Period, Slot::Wilayah],
            Selection::Province => &[Slot::Province, Slot::Kabupaten, Slot::Wilayah],
            Selection::Kabupaten => &[Slot::Kabupaten, Slot::Wilayah],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket {
    slot: Slot,
    generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub surveys: Vec<Survey>,
    pub survey_id: Option<String>,
    pub survey_name: String,
    pub period_options: Vec<Period>,
    pub region_group_id: Option<String>,
    pub template_id: Option<String>,
    pub period_id: Option<String>,
    pub period_name: String,
    pub role: String,
    pub province_options: Vec<RegionOption>,
    /// Province `full_code`
    pub province_code: Option<String>,
    pub province_name: String,
    pub kabupaten_options: Vec<RegionOption>,
    pub kabupaten_id: Option<String>,
    pub kabupaten_name: String,
    pub wilayah: WilayahStatus,
    generations: [u64; Slot::COUNT],
}

impl SelectionState {
    /// Survey, period and kabupaten picked and the wilayah cache is ready
    pub fn is_dispatch_ready(&self) -> bool {
        self.survey_id.is_some()
            && self.period_id.is_some()
            && self.kabupaten_id.is_some()
            && self.wilayah.is_ready()
    }

    pub fn wilayah_key(&self) -> Option<WilayahKey> {
        Some(WilayahKey::new(
            self.survey_id.clone()?,
            self.period_id.clone()?,
            self.kabupaten_id.clone()?,
        ))
    }

    /// Context for an action; empty strings mark what is still missing
    pub fn action_context(&self) -> ActionContext {
        ActionContext {
            survey_id: self.survey_id.clone().unwrap_or_default(),
            period_id: self.period_id.clone().unwrap_or_default(),
            template_id: self.template_id.clone().unwrap_or_default(),
            group_id: self.region_group_id.clone().unwrap_or_default(),
            kab_id: self.kabupaten_id.clone().unwrap_or_default(),
            kab_name: self.kabupaten_name.clone(),
            survey_name: self.survey_name.clone(),
            period_name: self.period_name.clone(),
        }
    }

    fn generation(&self, slot: Slot) -> u64 {
        self.generations[slot.index()]
    }

    fn reset(&mut self, selection: Selection) {
        for slot in selection.resets() {
            slot.clear(self);
            self.generations[slot.index()] += 1;
        }
    }

    fn ticket(&self, slot: Slot) -> Ticket {
        Ticket {
            slot,
            generation: self.generation(slot),
        }
    }
}

fn option_name<'a>(options: &'a [RegionOption], matches: impl Fn(&RegionOption) -> bool) -> &'a str {
    options
        .iter()
        .find(|option| matches(option))
        .map_or("", |option| option.name.as_str())
}

pub struct SelectionMachine {
    state: watch::Sender<SelectionState>,
    backend: Arc<dyn ConsoleBackend>,
    regions: RegionResolver,
    wilayah: WilayahOrchestrator,
    notices: Arc<NoticeBoard>,
}

impl SelectionMachine {
    pub fn new(backend: Arc<dyn ConsoleBackend>, notices: Arc<NoticeBoard>) -> Self {
        let (state, _rx) = watch::channel(SelectionState::default());
        Self {
            state,
            regions: RegionResolver::new(backend.clone()),
            wilayah: WilayahOrchestrator::new(backend.clone()),
            backend,
            notices,
        }
    }

    pub fn snapshot(&self) -> SelectionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.state.subscribe()
    }

    /// Install the session's survey list, clearing any previous picks
    pub fn set_surveys(&self, surveys: Vec<Survey>) {
        self.state.send_modify(|state| {
            state.reset(Selection::Survey);
            state.surveys = surveys;
        });
    }

    pub async fn select_survey(&self, survey_id: &str) {
        let mut ticket = None;
        self.state.send_modify(|state| {
            state.reset(Selection::Survey);
            let survey = state.surveys.iter().find(|s| s.id == survey_id).cloned();
            state.survey_id = Some(survey_id.to_string());
            if let Some(survey) = survey {
                state.survey_name = survey.name;
                state.region_group_id =
                    Some(survey.region_group_id).filter(|group| !group.is_empty());
            }
            ticket = Some(state.ticket(Slot::Survey));
        });
        let Some(ticket) = ticket else { return };
        info!(survey_id, "survey selected");

        let detail = match self.backend.survey_detail(survey_id).await {
            Ok(detail) => detail,
            Err(err) => {
                if self.is_current(ticket) {
                    self.notices.push_error("Failed to load survey details", &err);
                }
                return;
            }
        };

        let mut group_id = None;
        let applied = self.apply(ticket, "survey detail", |state| {
            if let Some(group) = detail.region_group_id.clone().filter(|g| !g.is_empty()) {
                state.region_group_id = Some(group);
            }
            state.template_id = detail.template_id.clone();
            state.period_options = detail.periods.clone();
            group_id = state.region_group_id.clone();
        });
        if !applied {
            return;
        }
        let Some(group_id) = group_id else {
            self.notices
                .push(NoticeKind::Backend, format!("Survey {survey_id} has no region group"));
            return;
        };

        match self.regions.provinces(&group_id).await {
            Ok(provinces) => {
                self.apply(ticket, "provinces", |state| state.province_options = provinces);
            }
            Err(err) => {
                if self.is_current(ticket) {
                    self.notices.push_error("Failed to load regions", &err);
                }
            }
        }
    }

    pub async fn select_period(&self, period_id: &str) {
        let mut pending = None;
        self.state.send_modify(|state| {
            state.reset(Selection::Period);
            state.period_id = Some(period_id.to_string());
            state.period_name = state
                .period_options
                .iter()
                .find(|p| p.id == period_id)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            pending = Some((state.ticket(Slot::Period), state.survey_id.clone()));
        });
        let Some((ticket, Some(survey_id))) = pending else {
            return;
        };
        info!(survey_id = %survey_id, period_id, "period selected");

        match self.backend.user_role(&survey_id, period_id).await {
            Ok(role) => {
                self.apply(ticket, "role", |state| state.role = role);
            }
            Err(err) => {
                if self.is_current(ticket) {
                    self.notices.push_error("Failed to load role", &err);
                }
            }
        }
    }

    /// `province_code` is the province's `full_code`
    pub async fn select_province(&self, province_code: &str) {
        let mut pending = None;
        self.state.send_modify(|state| {
            state.reset(Selection::Province);
            state.province_code = Some(province_code.to_string());
            state.province_name =
                option_name(&state.province_options, |p| p.full_code == province_code).to_string();
            pending = Some((state.ticket(Slot::Province), state.region_group_id.clone()));
        });
        let Some((ticket, Some(group_id))) = pending else {
            return;
        };
        info!(province = province_code, "province selected");

        match self.regions.kabupaten(&group_id, province_code).await {
            Ok(kabupaten) => {
                self.apply(ticket, "kabupaten", |state| state.kabupaten_options = kabupaten);
            }
            Err(err) => {
                if self.is_current(ticket) {
                    self.notices.push_error("Failed to load kabupaten", &err);
                }
            }
        }
    }

    pub async fn select_kabupaten(&self, kabupaten_id: &str) {
        self.state.send_modify(|state| {
            state.reset(Selection::Kabupaten);
            state.kabupaten_id = Some(kabupaten_id.to_string());
            state.kabupaten_name =
                option_name(&state.kabupaten_options, |k| k.id == kabupaten_id).to_string();
        });
        info!(kab_id = kabupaten_id, "kabupaten selected");
        self.run_wilayah().await;
    }

    /// Re-run check-then-fetch for the current triple, e.g. after an error
    pub async fn refresh_wilayah(&self) {
        self.state.send_modify(|state| {
            Slot::Wilayah.clear(state);
            state.generations[Slot::Wilayah.index()] += 1;
        });
        self.run_wilayah().await;
    }

    async fn run_wilayah(&self) {
        let (ticket, key, group_id) = {
            let state = self.state.borrow();
            let ticket = state.ticket(Slot::Wilayah);
            (ticket, state.wilayah_key(), state.region_group_id.clone())
        };
        let (Some(key), Some(group_id)) = (key, group_id) else {
            debug!("wilayah check skipped, selection incomplete");
            return;
        };

        let status = self
            .wilayah
            .ensure_ready(&key, &group_id, |status| {
                let status = status.clone();
                self.apply(ticket, "wilayah status", |state| state.wilayah = status);
            })
            .await;

        if let Some(failure) = &status.error {
            if !failure.reported && self.is_current(ticket) {
                self.notices
                    .push(NoticeKind::Transient, format!("Failed to load wilayah: {}", failure.message));
            }
        }
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.state.borrow().generation(ticket.slot) == ticket.generation
    }

    /// Apply `update` only if `ticket` is still current
    fn apply(&self, ticket: Ticket, what: &str, update: impl FnOnce(&mut SelectionState)) -> bool {
        self.state.send_if_modified(|state| {
            let current = state.generation(ticket.slot);
            if current != ticket.generation {
                debug!(
                    slot = ?ticket.slot,
                    ticket = ticket.generation,
                    current,
                    what,
                    "stale response dropped"
                );
                return false;
            }
            update(state);
            true
        })
    }
}

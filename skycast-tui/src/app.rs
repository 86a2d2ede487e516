use crossterm::event::{KeyCode, KeyEvent};
use skycast_core::geolocate::Position;
use skycast_core::{QueryTarget, WeatherError, WeatherSnapshot};

/// Outcome of the latest fetch, as shown to the user.
#[derive(Debug, Clone)]
pub enum FetchState {
    Pending,
    Error(String),
    Success(WeatherSnapshot),
}

/// How the current target was chosen. Geolocation may only override the
/// startup default, never a user search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetSource {
    Default,
    Located,
    Searched,
}

/// Everything the event loop feeds into the state machine.
#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    Located(Position),
    Fetched {
        generation: u64,
        outcome: Result<WeatherSnapshot, WeatherError>,
    },
}

/// Side effect the caller must perform after an event is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Fetch { target: QueryTarget, generation: u64 },
    Quit,
}

/// The single view-state slot: current target, latest fetch outcome, and the
/// generation counter that makes stale in-flight responses ignorable.
pub struct AppState {
    target: QueryTarget,
    source: TargetSource,
    fetch: FetchState,
    generation: u64,
    /// `Some(buffer)` while the search input is open.
    search: Option<String>,
    spinner_frame: usize,
}

impl AppState {
    /// Initial state plus the command for the very first fetch.
    pub fn new(default_city: &str) -> (Self, Command) {
        let mut state = AppState {
            target: QueryTarget::City(default_city.to_string()),
            source: TargetSource::Default,
            fetch: FetchState::Pending,
            generation: 0,
            search: None,
            spinner_frame: 0,
        };
        let boot = state.refetch();
        (state, boot)
    }

    pub fn target(&self) -> &QueryTarget {
        &self.target
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch
    }

    pub fn search_input(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn spinner_frame(&self) -> usize {
        self.spinner_frame
    }

    pub fn handle_event(&mut self, event: Event) -> Option<Command> {
        match event {
            Event::Tick => {
                self.spinner_frame = self.spinner_frame.wrapping_add(1);
                None
            }
            Event::Located(position) => self.on_located(position),
            Event::Fetched { generation, outcome } => {
                self.on_fetched(generation, outcome);
                None
            }
            Event::Key(key) => self.on_key(key),
        }
    }

    /// Start a new fetch for the current target. Bumping the generation
    /// invalidates whatever is still in flight.
    fn refetch(&mut self) -> Command {
        self.generation += 1;
        self.fetch = FetchState::Pending;
        Command::Fetch {
            target: self.target.clone(),
            generation: self.generation,
        }
    }

    fn on_located(&mut self, position: Position) -> Option<Command> {
        if self.source != TargetSource::Default {
            // The user already picked a city; their choice wins.
            return None;
        }

        self.target = QueryTarget::Coordinates {
            lat: position.lat,
            lon: position.lon,
        };
        self.source = TargetSource::Located;
        Some(self.refetch())
    }

    fn on_fetched(&mut self, generation: u64, outcome: Result<WeatherSnapshot, WeatherError>) {
        if generation != self.generation {
            // A newer target superseded this request while it was in flight.
            return;
        }

        self.fetch = match outcome {
            Ok(snapshot) => FetchState::Success(snapshot),
            Err(err) => FetchState::Error(err.to_string()),
        };
    }

    fn on_key(&mut self, key: KeyEvent) -> Option<Command> {
        if self.search.is_some() {
            return self.on_search_key(key);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
            KeyCode::Char('r') => Some(self.refetch()),
            KeyCode::Char('/') | KeyCode::Char('s') => {
                self.search = Some(String::new());
                None
            }
            _ => None,
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) -> Option<Command> {
        let buffer = self.search.as_mut()?;

        match key.code {
            KeyCode::Esc => {
                self.search = None;
                None
            }
            KeyCode::Backspace => {
                buffer.pop();
                None
            }
            KeyCode::Enter => {
                let city = buffer.trim().to_string();
                if city.is_empty() {
                    // Nothing to search for; keep the input open.
                    return None;
                }
                self.search = None;
                self.target = QueryTarget::City(city);
                self.source = TargetSource::Searched;
                Some(self.refetch())
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use skycast_core::Condition;

    fn snapshot(city: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            city: city.to_string(),
            country: Some("GB".to_string()),
            temperature_c: 18.0,
            feels_like_c: 17.0,
            temp_min_c: 15.0,
            temp_max_c: 21.0,
            humidity_pct: 60,
            pressure_hpa: 1013,
            wind_speed_mps: 3.0,
            visibility_m: Some(10000),
            cloud_cover_pct: Some(20),
            condition: Condition::Clear,
            description: "clear sky".to_string(),
            sunrise: None,
            sunset: None,
            fetched_at: Utc::now(),
        }
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::from(code))
    }

    fn submit_search(state: &mut AppState, city: &str) -> Vec<Command> {
        let mut commands = Vec::new();
        commands.extend(state.handle_event(key(KeyCode::Char('/'))));
        for c in city.chars() {
            commands.extend(state.handle_event(key(KeyCode::Char(c))));
        }
        commands.extend(state.handle_event(key(KeyCode::Enter)));
        commands
    }

    fn fetch_generation(command: &Command) -> u64 {
        match command {
            Command::Fetch { generation, .. } => *generation,
            Command::Quit => panic!("expected a fetch command"),
        }
    }

    #[test]
    fn boot_fetches_the_default_city() {
        let (state, boot) = AppState::new("London");
        assert_eq!(
            boot,
            Command::Fetch {
                target: QueryTarget::City("London".to_string()),
                generation: 1
            }
        );
        assert!(matches!(state.fetch_state(), FetchState::Pending));
    }

    #[test]
    fn search_submit_replaces_target_and_fetches_exactly_once() {
        let (mut state, _boot) = AppState::new("London");

        let commands = submit_search(&mut state, "Paris");

        assert_eq!(
            commands,
            vec![Command::Fetch {
                target: QueryTarget::City("Paris".to_string()),
                generation: 2
            }]
        );
        assert_eq!(state.target(), &QueryTarget::City("Paris".to_string()));
        assert!(matches!(state.fetch_state(), FetchState::Pending));
    }

    #[test]
    fn empty_search_submit_is_a_no_op() {
        let (mut state, _boot) = AppState::new("London");

        let commands = submit_search(&mut state, "   ");

        assert!(commands.is_empty());
        // The input stays open so the user can keep typing.
        assert!(state.search_input().is_some());
        assert_eq!(state.target(), &QueryTarget::City("London".to_string()));
    }

    #[test]
    fn stale_fetch_outcome_is_dropped() {
        let (mut state, boot) = AppState::new("London");
        let stale_generation = fetch_generation(&boot);

        let commands = submit_search(&mut state, "Paris");
        let fresh_generation = fetch_generation(&commands[0]);

        // The London response arrives after the Paris fetch started.
        state.handle_event(Event::Fetched {
            generation: stale_generation,
            outcome: Ok(snapshot("London")),
        });
        assert!(matches!(state.fetch_state(), FetchState::Pending));

        state.handle_event(Event::Fetched {
            generation: fresh_generation,
            outcome: Ok(snapshot("Paris")),
        });
        match state.fetch_state() {
            FetchState::Success(s) => assert_eq!(s.city, "Paris"),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn geolocation_overrides_the_untouched_default() {
        let (mut state, boot) = AppState::new("London");
        let default_generation = fetch_generation(&boot);

        let command = state
            .handle_event(Event::Located(Position { lat: 47.6, lon: -122.3 }))
            .expect("geolocation must trigger a fetch");

        assert_eq!(
            command,
            Command::Fetch {
                target: QueryTarget::Coordinates { lat: 47.6, lon: -122.3 },
                generation: default_generation + 1
            }
        );

        // The default-city fetch is now stale even if it lands first.
        state.handle_event(Event::Fetched {
            generation: default_generation,
            outcome: Ok(snapshot("London")),
        });
        assert!(matches!(state.fetch_state(), FetchState::Pending));
    }

    #[test]
    fn geolocation_after_a_search_is_discarded() {
        let (mut state, _boot) = AppState::new("London");
        submit_search(&mut state, "Paris");

        let command = state.handle_event(Event::Located(Position { lat: 47.6, lon: -122.3 }));

        assert_eq!(command, None);
        assert_eq!(state.target(), &QueryTarget::City("Paris".to_string()));
    }

    #[test]
    fn error_then_retry_reissues_the_same_target() {
        let (mut state, boot) = AppState::new("London");
        let generation = fetch_generation(&boot);

        state.handle_event(Event::Fetched {
            generation,
            outcome: Err(WeatherError::Upstream {
                status: 404,
                message: "city not found".to_string(),
            }),
        });
        match state.fetch_state() {
            FetchState::Error(message) => assert_eq!(message, "city not found"),
            other => panic!("expected error, got {other:?}"),
        }

        let retry = state
            .handle_event(key(KeyCode::Char('r')))
            .expect("retry must trigger a fetch");
        assert_eq!(
            retry,
            Command::Fetch {
                target: QueryTarget::City("London".to_string()),
                generation: generation + 1
            }
        );
        assert!(matches!(state.fetch_state(), FetchState::Pending));
    }

    #[test]
    fn quit_keys_quit_outside_search_mode() {
        let (mut state, _boot) = AppState::new("London");
        assert_eq!(state.handle_event(key(KeyCode::Char('q'))), Some(Command::Quit));

        let (mut state, _boot) = AppState::new("London");
        assert_eq!(state.handle_event(key(KeyCode::Esc)), Some(Command::Quit));
    }

    #[test]
    fn esc_in_search_mode_cancels_instead_of_quitting() {
        let (mut state, _boot) = AppState::new("London");
        state.handle_event(key(KeyCode::Char('/')));
        state.handle_event(key(KeyCode::Char('P')));

        assert_eq!(state.handle_event(key(KeyCode::Esc)), None);
        assert!(state.search_input().is_none());
        assert_eq!(state.target(), &QueryTarget::City("London".to_string()));
    }

    #[test]
    fn backspace_edits_the_search_buffer() {
        let (mut state, _boot) = AppState::new("London");
        state.handle_event(key(KeyCode::Char('/')));
        state.handle_event(key(KeyCode::Char('a')));
        state.handle_event(key(KeyCode::Char('b')));
        state.handle_event(key(KeyCode::Backspace));

        assert_eq!(state.search_input(), Some("a"));
    }

    #[test]
    fn tick_advances_the_spinner_only() {
        let (mut state, _boot) = AppState::new("London");
        let before = state.spinner_frame();

        assert_eq!(state.handle_event(Event::Tick), None);
        assert_eq!(state.spinner_frame(), before + 1);
    }
}

// src/main.rs
//
// Line-driven shell over the library: navigate routes, browse the catalog,
// sign in, comment and drive the player.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use streamhub::application::commands;
use streamhub::application::views::{
    AuthForm, CatalogView, LoadOutcome, ProfileEditor, SubmitOutcome, VideoPageView,
};
use streamhub::application::{AppState, CommentDto, ProfileDto, Route, VideoCardDto, VideoDetailDto};
use streamhub::config::AppConfig;
use streamhub::domain::AuthMode;
use streamhub::services::PlaybackController;

const HELP: &str = "\
navigation: go <path> | search <term> | more | where | session | help | quit
account:    signin <email> <password> | signup <email> <password> | signout | mode
profile:    edit | username <name> | avatar <url> | save
comments:   comment <text>
player:     play | mute | volume <0-1> | seek <percent> | fwd | back | rate <x>
            fs | move | leave | status";

struct Shell {
    state: Arc<AppState>,
    route: Route,
    catalog: CatalogView,
    auth_form: AuthForm,
    profile: ProfileEditor,
    video_page: VideoPageView,
    #[cfg(unix)]
    mpv: Option<Arc<streamhub::integrations::MpvClient>>,
}

impl Shell {
    fn new(state: Arc<AppState>) -> Self {
        Self {
            catalog: CatalogView::new(Arc::clone(&state.video_service)),
            auth_form: AuthForm::new(Arc::clone(&state.session_store)),
            profile: ProfileEditor::new(Arc::clone(&state.session_store)),
            video_page: VideoPageView::new(
                Arc::clone(&state.video_service),
                Arc::clone(&state.comment_service),
                Arc::clone(&state.session_store),
                Arc::clone(&state.event_bus),
                state.player_config.clone(),
            ),
            route: Route::NotFound,
            state,
            #[cfg(unix)]
            mpv: None,
        }
    }

    fn player(&self) -> Option<Arc<PlaybackController>> {
        self.video_page.player()
    }

    async fn navigate(&mut self, mut route: Route) {
        if route.requires_session() {
            if let Some(redirect) = self.profile.redirect() {
                route = redirect;
            }
        }
        self.close_player().await;

        println!("-> {}", route.render());
        self.route = route.clone();

        match route {
            Route::Catalog { search } => {
                if self.catalog.load_first_page(search).await.is_err() {
                    println!("error: {}", self.catalog.last_error().unwrap_or_default());
                    return;
                }
                if let Some(summary) = self.catalog.summary() {
                    println!("{}", summary);
                }
                print_cards(&self.catalog.videos().iter().map(VideoCardDto::from).collect::<Vec<_>>());
                if self.catalog.videos().is_empty() {
                    println!("No videos found");
                }
            }
            Route::Video { id } => {
                self.video_page.load(id).await;
                if let Some(error) = self.video_page.error() {
                    println!("error: {}", error);
                    return;
                }
                if let Some(video) = self.video_page.video() {
                    print_json(&VideoDetailDto::from(video));
                }
                println!("related:");
                print_cards(&self.video_page.related().iter().map(VideoCardDto::from).collect::<Vec<_>>());
                self.print_comments();
                self.open_player().await;
            }
            Route::Auth => println!("mode: {:?}", self.auth_form.mode()),
            Route::Profile => match self.profile.profile() {
                Some(profile) => print_json(&ProfileDto::from(&profile)),
                None => println!("Please log in to view your profile."),
            },
            Route::NotFound => println!("Page not found"),
        }
    }

    fn print_comments(&self) {
        let Some(thread) = self.video_page.comments() else {
            return;
        };
        if let Some(error) = thread.error() {
            println!("comments unavailable: {}", error);
        }
        println!("comments ({}):", thread.comments().len());
        for comment in thread.comments() {
            let dto = CommentDto::from(comment);
            println!("  {} ({}): {}", dto.author, dto.created_at, dto.content);
        }
    }

    #[cfg(unix)]
    async fn open_player(&mut self) {
        use streamhub::integrations::{MpvClient, MpvConfig};
        use streamhub::services::{FullscreenHost, MediaElement};

        let (Some(player), Some(video)) = (self.player(), self.video_page.video().cloned()) else {
            return;
        };

        let mpv = Arc::new(MpvClient::new(MpvConfig {
            binary: self.state.config.mpv_binary.clone(),
            ..MpvConfig::default()
        }));
        if let Err(e) = mpv.launch(&video.video_url, &video.title).await {
            log::warn!("player not started, controls work without video: {}", e);
            return;
        }

        let element: Arc<dyn MediaElement> = mpv.clone();
        let host: Arc<dyn FullscreenHost> = mpv.clone();
        player.attach(element, Some(host)).await;
        self.mpv = Some(mpv);
    }

    #[cfg(not(unix))]
    async fn open_player(&mut self) {}

    #[cfg(unix)]
    async fn close_player(&mut self) {
        self.video_page.unload();
        if let Some(mpv) = self.mpv.take() {
            if let Err(e) = mpv.stop().await {
                log::warn!("player did not stop cleanly: {}", e);
            }
        }
    }

    #[cfg(not(unix))]
    async fn close_player(&mut self) {
        self.video_page.unload();
    }

    /// Returns false when the shell should exit
    async fn handle(&mut self, line: &str) -> bool {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "" => {}
            "help" => println!("{}", HELP),
            "quit" | "exit" => return false,
            "go" => self.navigate(Route::parse(rest)).await,
            "search" => {
                self.navigate(Route::Catalog {
                    search: Some(rest.to_string()),
                })
                .await
            }
            "more" => match self.catalog.load_more().await {
                Ok(LoadOutcome::Loaded(count)) => {
                    let videos = self.catalog.videos();
                    let start = videos.len() - count;
                    print_cards(&videos[start..].iter().map(VideoCardDto::from).collect::<Vec<_>>());
                }
                Ok(LoadOutcome::Exhausted) => println!("No more videos to load"),
                Ok(other) => println!("{:?}", other),
                Err(e) => println!("error: {}", e),
            },
            "where" => println!("{}", self.route.render()),
            "session" => print_json(&commands::get_session(&self.state)),
            "mode" => {
                self.auth_form.toggle_mode();
                println!("mode: {:?}", self.auth_form.mode());
            }
            "signin" | "signup" => {
                let (email, password) = rest.split_once(' ').unwrap_or((rest, ""));
                let wanted = if command == "signin" {
                    AuthMode::SignIn
                } else {
                    AuthMode::SignUp
                };
                if self.auth_form.mode() != wanted {
                    self.auth_form.toggle_mode();
                }
                self.auth_form.email = email.to_string();
                self.auth_form.password = password.trim().to_string();
                let outcome = self.auth_form.submit().await;
                if let Some(message) = self.auth_form.message() {
                    println!("{}", message);
                }
                if outcome == SubmitOutcome::SignedIn {
                    self.navigate(Route::Catalog { search: None }).await;
                }
            }
            "signout" => {
                let route = self.profile.sign_out().await;
                self.navigate(route).await;
            }
            "edit" => {
                self.profile.begin_edit();
                println!("editing {}", self.profile.username);
            }
            "username" => self.profile.username = rest.to_string(),
            "avatar" => self.profile.avatar_url = rest.to_string(),
            "save" => {
                if self.profile.save().await {
                    if let Some(profile) = self.profile.profile() {
                        print_json(&ProfileDto::from(&profile));
                    }
                } else if let Some(error) = self.profile.error() {
                    println!("error: {}", error);
                }
            }
            "comment" => match self.video_page.comments_mut() {
                Some(thread) => {
                    thread.draft = rest.to_string();
                    if !thread.post().await {
                        println!("error: {}", thread.error().unwrap_or_default());
                    }
                    self.print_comments();
                }
                None => println!("open a video first"),
            },
            _ => return self.handle_player(command, rest).await,
        }
        true
    }

    async fn handle_player(&mut self, command: &str, arg: &str) -> bool {
        let Some(player) = self.player() else {
            println!("unknown command or no video open; try `help`");
            return true;
        };

        match command {
            "play" => {
                print_json(&commands::toggle_play(&player).await);
                return true;
            }
            "mute" => {
                player.toggle_mute().await;
            }
            "volume" => match arg.parse::<f64>() {
                Ok(volume) => {
                    if let Err(e) = commands::set_volume(&player, volume).await {
                        println!("error: {}", e);
                    }
                }
                Err(_) => println!("volume takes a number between 0 and 1"),
            },
            "seek" => match arg.parse::<f64>() {
                Ok(percent) => {
                    commands::seek(&player, percent).await;
                }
                Err(_) => println!("seek takes a percentage"),
            },
            "fwd" => {
                player.skip_forward().await;
            }
            "back" => {
                player.skip_back().await;
            }
            "rate" => match arg.trim_end_matches('x').parse::<f64>() {
                Ok(rate) => {
                    if let Err(e) = commands::set_playback_rate(&player, rate).await {
                        println!("error: {}", e);
                    }
                }
                Err(_) => println!("rate takes one of 0.25 .. 2"),
            },
            "fs" => match player.toggle_fullscreen().await {
                Some(fullscreen) => println!("fullscreen: {}", fullscreen),
                None => println!("fullscreen unavailable"),
            },
            "move" => player.pointer_moved(),
            "leave" => player.pointer_left(),
            "status" => {}
            _ => {
                println!("unknown command; try `help`");
                return true;
            }
        }

        print_json(&commands::player_status(&player));
        true
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("could not render output: {}", e),
    }
}

fn print_cards(cards: &[VideoCardDto]) {
    for card in cards {
        println!("  {}  {}  [{}]  {}", card.id, card.title, card.duration, card.created_at);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streamhub=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 1. CONFIGURATION (missing backend settings are fatal)
    let config = AppConfig::from_env().context("invalid configuration")?;

    // 2. STATE (client, repositories, services)
    let state = Arc::new(AppState::new(config).context("could not initialize application")?);

    match state.client.check_connection().await {
        Ok(()) => log::info!("connected to backend"),
        Err(e) => log::error!("backend connection check failed: {}", e),
    }

    // 3. SESSION
    state.session_store.initialize().await;

    let mut shell = Shell::new(Arc::clone(&state));
    shell.navigate(Route::Catalog { search: None }).await;
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !shell.handle(&line).await {
            break;
        }
    }

    shell.close_player().await;
    state.session_store.shutdown();
    Ok(())
}

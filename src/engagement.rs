//! Per-view engagement state: speech playback, like, bookmark, and the
//! share / AI-assistant menus.
//!
//! Everything here is client-local and non-authoritative. The store is never
//! consulted: the like counter is an optimistic local copy seeded from the
//! post, and nothing syncs back.

use url::Url;

use crate::{
    post::Post,
    render,
    share::{self, AiAssistant, ShareAction, ShareTarget},
};

/// Speech playback phase of a post view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Playback {
    /// Nothing is being read out.
    #[default]
    Idle,
    /// The post body is being read out.
    Playing,
}

/// The speech-synthesis facility the controller drives.
///
/// Contract: `speak` replaces any active utterance, so at most one playback
/// is ever active per facility. A facility that cannot synthesize reports
/// `available() == false` and the controller turns every toggle into a no-op.
pub trait SpeechSynthesizer {
    /// Whether synthesis can be performed at all.
    fn available(&self) -> bool {
        true
    }

    /// Start speaking `text`, cancelling any active utterance first.
    fn speak(&mut self, text: &str);

    /// Stop the active utterance, if any.
    fn cancel(&mut self);
}

/// The absent facility: reports unavailable, so speech toggles do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpeech;

impl SpeechSynthesizer for NoSpeech {
    fn available(&self) -> bool {
        false
    }

    fn speak(&mut self, _text: &str) {}

    fn cancel(&mut self) {}
}

/// Client-local interaction state layered over one loaded post view.
///
/// Construct a fresh value when navigating to another post; nothing carries
/// over between views.
#[derive(Debug)]
pub struct Engagement<S> {
    speech: S,
    page_url: Url,
    title: String,
    speech_text: String,
    playback: Playback,
    liked: bool,
    like_count: u64,
    bookmarked: bool,
    share_menu: bool,
    ai_menu: bool,
}

impl<S: SpeechSynthesizer> Engagement<S> {
    /// Fresh state for a newly loaded post view.
    pub fn for_post(post: &Post, page_url: Url, speech: S) -> Self {
        Self {
            speech_text: render::plain_text(&post.content),
            title: post.title.clone(),
            like_count: post.like_count,
            page_url,
            speech,
            playback: Playback::default(),
            liked: false,
            bookmarked: false,
            share_menu: false,
            ai_menu: false,
        }
    }

    #[must_use]
    pub const fn playback(&self) -> Playback {
        self.playback
    }

    #[must_use]
    pub const fn liked(&self) -> bool {
        self.liked
    }

    /// The optimistic local like count shown next to the heart.
    #[must_use]
    pub const fn like_count(&self) -> u64 {
        self.like_count
    }

    #[must_use]
    pub const fn bookmarked(&self) -> bool {
        self.bookmarked
    }

    #[must_use]
    pub const fn share_menu_open(&self) -> bool {
        self.share_menu
    }

    #[must_use]
    pub const fn ai_menu_open(&self) -> bool {
        self.ai_menu
    }

    /// Toggle speech playback. Idle starts reading the stripped body text;
    /// playing cancels back to idle. No-op when the facility is absent.
    pub fn toggle_speech(&mut self) {
        if !self.speech.available() {
            return;
        }
        match self.playback {
            Playback::Playing => {
                self.speech.cancel();
                self.playback = Playback::Idle;
            }
            Playback::Idle => {
                self.speech.speak(&self.speech_text);
                self.playback = Playback::Playing;
            }
        }
    }

    /// The facility's completion or error callback: playback fell back to
    /// idle on its own.
    pub fn speech_ended(&mut self) {
        self.playback = Playback::Idle;
    }

    /// Optimistic like toggle; adjusts the local count by one and returns
    /// the new liked state. Never consults the store.
    pub fn toggle_like(&mut self) -> bool {
        self.liked = !self.liked;
        self.like_count = if self.liked {
            self.like_count.saturating_add(1)
        } else {
            self.like_count.saturating_sub(1)
        };
        self.liked
    }

    /// Local bookmark toggle; returns the new state.
    pub fn toggle_bookmark(&mut self) -> bool {
        self.bookmarked = !self.bookmarked;
        self.bookmarked
    }

    /// Open or close the share menu. Independent of the AI menu.
    pub fn toggle_share_menu(&mut self) {
        self.share_menu = !self.share_menu;
    }

    /// Open or close the AI-assistant menu. Independent of the share menu.
    pub fn toggle_ai_menu(&mut self) {
        self.ai_menu = !self.ai_menu;
    }

    /// Resolve a share selection and close the share menu.
    pub fn share(&mut self, target: ShareTarget) -> ShareAction {
        self.share_menu = false;
        share::share_action(target, &self.page_url, &self.title)
    }

    /// Resolve an assistant deep link and close the AI menu.
    pub fn open_assistant(&mut self, assistant: AiAssistant) -> Url {
        self.ai_menu = false;
        share::assistant_url(assistant, &self.page_url)
    }
}

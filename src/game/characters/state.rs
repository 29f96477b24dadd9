// Character state machine

use log::{debug, warn};

use super::animation::FALLBACK_CLIP;
use super::character::CharacterBody;
use crate::engine::input::InputProvider;
use crate::engine::physics::PhysicsWorld;
use crate::game::weapons::KnifeManager;

/// Redirects allowed from `enter` before the machine stops following them
const MAX_ENTER_REDIRECTS: usize = 8;

/// Identifies each character state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StateKind {
    /// Standing still on ground
    #[default]
    Idle,
    /// Moving horizontally on ground
    Walk,
    /// Moving fast on ground (requires the run unlock)
    Run,
    /// Crouching on ground
    Crouch,
    /// In the air, moving upward
    Jump,
    /// In the air, moving downward
    Fall,
    /// Sliding down a wall
    WallCling,
    /// Throwing the knife
    Shoot,
    /// Dancing (requires the dance unlock)
    Dance,
    /// Character is dead
    Dead,
}

impl StateKind {
    /// Get the animation clip for this state
    pub fn animation_name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Walk => "Walk",
            Self::Run => "Run",
            Self::Crouch => "Crouch",
            Self::Jump => "Jump",
            Self::Fall => "Fall",
            Self::WallCling => "Cling",
            Self::Shoot => "Shoot",
            Self::Dance => "Dance",
            Self::Dead => "Dead",
        }
    }

    /// Create a fresh instance of this state
    pub fn instantiate(self) -> Box<dyn CharacterState> {
        use super::states::{Crouch, Dance, Dead, Fall, Idle, Jump, Run, Shoot, Walk, WallCling};

        match self {
            Self::Idle => Box::new(Idle),
            Self::Walk => Box::new(Walk),
            Self::Run => Box::new(Run),
            Self::Crouch => Box::new(Crouch),
            Self::Jump => Box::new(Jump),
            Self::Fall => Box::new(Fall),
            Self::WallCling => Box::new(WallCling),
            Self::Shoot => Box::new(Shoot::default()),
            Self::Dance => Box::new(Dance::default()),
            Self::Dead => Box::new(Dead),
        }
    }
}

/// Everything a state may read or command during a callback
pub struct StateContext<'a> {
    pub body: &'a mut CharacterBody,
    pub input: &'a dyn InputProvider,
    pub physics: &'a mut PhysicsWorld,
    pub knives: &'a mut KnifeManager,
}

/// Behavior of one character state.
///
/// `enter` and `tick` may request a transition by returning the next state. A request from
/// `enter` is applied immediately, making the entered state last zero time.
pub trait CharacterState: std::fmt::Debug {
    fn kind(&self) -> StateKind;

    /// Called once when the state becomes active
    fn enter(&mut self, ctx: &mut StateContext<'_>) -> Option<StateKind> {
        ctx.body
            .animation
            .play_or_fallback(self.kind().animation_name(), FALLBACK_CLIP);
        None
    }

    /// Called every simulation tick while active
    fn tick(&mut self, ctx: &mut StateContext<'_>, dt: f32) -> Option<StateKind>;

    /// Called once when the state is replaced
    fn exit(&mut self, _ctx: &mut StateContext<'_>) {}
}

/// Runs exactly one active state and applies transitions synchronously
#[derive(Debug)]
pub struct CharacterStateMachine {
    current: Box<dyn CharacterState>,
    previous: StateKind,
    state_time: f32,
    /// Initial state has been entered
    started: bool,
    transition_count: u64,
}

impl Default for CharacterStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterStateMachine {
    pub fn new() -> Self {
        Self::with_initial(StateKind::Idle)
    }

    /// Machine that enters `initial` on its first tick
    pub fn with_initial(initial: StateKind) -> Self {
        Self::with_state(initial.instantiate())
    }

    /// Machine that enters the given state object on its first tick
    pub fn with_state(state: Box<dyn CharacterState>) -> Self {
        let previous = state.kind();
        Self {
            current: state,
            previous,
            state_time: 0.0,
            started: false,
            transition_count: 0,
        }
    }

    /// Get the current state
    pub fn state(&self) -> StateKind {
        self.current.kind()
    }

    /// Get the previous state
    #[allow(dead_code)]
    pub fn previous_state(&self) -> StateKind {
        self.previous
    }

    /// Get time spent in current state
    #[allow(dead_code)]
    pub fn state_time(&self) -> f32 {
        self.state_time
    }

    /// Number of transitions applied so far, redirects from `enter` included
    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Tick the current state, entering the initial state first if needed
    pub fn tick(&mut self, ctx: &mut StateContext<'_>, dt: f32) {
        if !self.started {
            self.started = true;
            let request = self.current.enter(ctx);
            self.follow_enter_requests(ctx, request);
        }

        self.state_time += dt;
        if let Some(next) = self.current.tick(ctx, dt) {
            self.switch_state(ctx, next);
        }
    }

    /// Exit the current state and enter `next`.
    ///
    /// Transitions requested by `next.enter` are followed immediately.
    pub fn switch_state(&mut self, ctx: &mut StateContext<'_>, next: StateKind) {
        if self.started {
            self.current.exit(ctx);
        }
        self.started = true;
        let request = self.replace(ctx, next);
        self.follow_enter_requests(ctx, request);
    }

    fn replace(&mut self, ctx: &mut StateContext<'_>, next: StateKind) -> Option<StateKind> {
        let from = self.current.kind();
        debug!("Character {}: {:?} -> {:?}", ctx.body.id, from, next);

        self.previous = from;
        self.current = next.instantiate();
        self.state_time = 0.0;
        self.transition_count += 1;
        self.current.enter(ctx)
    }

    fn follow_enter_requests(
        &mut self,
        ctx: &mut StateContext<'_>,
        mut request: Option<StateKind>,
    ) {
        let mut redirects = 0;
        while let Some(next) = request {
            let kind = self.current.kind();
            if next == kind {
                warn!(
                    "Character {}: {:?} requested itself during enter, ignoring",
                    ctx.body.id, kind
                );
                return;
            }
            if redirects >= MAX_ENTER_REDIRECTS {
                warn!(
                    "Character {}: too many transitions from enter, staying in {:?}",
                    ctx.body.id, kind
                );
                return;
            }
            redirects += 1;

            self.current.exit(ctx);
            request = self.replace(ctx, next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::ScriptedInput;
    use crate::game::characters::CharacterStats;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// State that records its callbacks and replays scripted requests
    #[derive(Debug)]
    struct Recorder {
        kind: StateKind,
        log: Log,
        on_enter: Option<StateKind>,
        on_tick: Option<StateKind>,
    }

    impl CharacterState for Recorder {
        fn kind(&self) -> StateKind {
            self.kind
        }

        fn enter(&mut self, _ctx: &mut StateContext<'_>) -> Option<StateKind> {
            self.log.borrow_mut().push(format!("enter {:?}", self.kind));
            self.on_enter
        }

        fn tick(&mut self, _ctx: &mut StateContext<'_>, _dt: f32) -> Option<StateKind> {
            self.log.borrow_mut().push(format!("tick {:?}", self.kind));
            self.on_tick
        }

        fn exit(&mut self, _ctx: &mut StateContext<'_>) {
            self.log.borrow_mut().push(format!("exit {:?}", self.kind));
        }
    }

    struct Fixture {
        physics: PhysicsWorld,
        knives: KnifeManager,
        body: CharacterBody,
        input: ScriptedInput,
    }

    impl Fixture {
        fn new() -> Self {
            let mut physics = PhysicsWorld::new();
            let mut body =
                CharacterBody::new(0, CharacterStats::standard(), &mut physics, 0.0, 0.0);
            body.grounded = true;
            Self {
                physics,
                knives: KnifeManager::default(),
                body,
                input: ScriptedInput::new(),
            }
        }

        fn tick(&mut self, machine: &mut CharacterStateMachine, dt: f32) {
            let mut ctx = StateContext {
                body: &mut self.body,
                input: &self.input,
                physics: &mut self.physics,
                knives: &mut self.knives,
            };
            machine.tick(&mut ctx, dt);
        }
    }

    fn recorder(
        kind: StateKind,
        log: &Log,
        on_enter: Option<StateKind>,
        on_tick: Option<StateKind>,
    ) -> Box<dyn CharacterState> {
        Box::new(Recorder {
            kind,
            log: log.clone(),
            on_enter,
            on_tick,
        })
    }

    #[test]
    fn test_initial_state_entered_lazily() {
        let mut fixture = Fixture::new();
        let log: Log = Rc::default();
        let mut machine =
            CharacterStateMachine::with_state(recorder(StateKind::Shoot, &log, None, None));

        assert!(log.borrow().is_empty());

        fixture.tick(&mut machine, 0.1);

        // Entering the initial state is not a transition
        assert_eq!(machine.transition_count(), 0);
        assert_eq!(*log.borrow(), vec!["enter Shoot", "tick Shoot"]);
    }

    #[test]
    fn test_tick_transition_exits_before_enter() {
        let mut fixture = Fixture::new();
        let log: Log = Rc::default();
        let state = recorder(StateKind::Shoot, &log, None, Some(StateKind::Dead));
        let mut machine = CharacterStateMachine::with_state(state);

        fixture.tick(&mut machine, 0.1);

        assert_eq!(*log.borrow(), vec!["enter Shoot", "tick Shoot", "exit Shoot"]);
        assert_eq!(machine.state(), StateKind::Dead);
        assert_eq!(machine.previous_state(), StateKind::Shoot);
        assert_eq!(machine.transition_count(), 1);
    }

    #[test]
    fn test_enter_redirect_is_zero_duration() {
        let mut fixture = Fixture::new();
        let log: Log = Rc::default();
        // Asks for Dead from enter; Dead is a real state and never logs
        let state = recorder(StateKind::Shoot, &log, Some(StateKind::Dead), None);
        let mut machine = CharacterStateMachine::with_state(state);

        fixture.tick(&mut machine, 0.1);

        assert_eq!(*log.borrow(), vec!["enter Shoot", "exit Shoot"]);
        assert_eq!(machine.state(), StateKind::Dead);
    }

    #[test]
    fn test_self_transition_from_enter_rejected() {
        let mut fixture = Fixture::new();
        let log: Log = Rc::default();
        let state = recorder(StateKind::Shoot, &log, Some(StateKind::Shoot), None);
        let mut machine = CharacterStateMachine::with_state(state);

        fixture.tick(&mut machine, 0.1);

        assert_eq!(*log.borrow(), vec!["enter Shoot", "tick Shoot"]);
        assert_eq!(machine.state(), StateKind::Shoot);
        assert_eq!(machine.transition_count(), 0);
    }

    #[test]
    fn test_switch_state_resets_state_time() {
        let mut fixture = Fixture::new();
        let mut machine = CharacterStateMachine::new();

        fixture.tick(&mut machine, 0.25);
        fixture.tick(&mut machine, 0.25);
        assert_eq!(machine.state(), StateKind::Idle);
        assert_eq!(machine.state_time(), 0.5);

        let mut ctx = StateContext {
            body: &mut fixture.body,
            input: &fixture.input,
            physics: &mut fixture.physics,
            knives: &mut fixture.knives,
        };
        machine.switch_state(&mut ctx, StateKind::Dead);

        assert_eq!(machine.state(), StateKind::Dead);
        assert_eq!(machine.state_time(), 0.0);
    }

    #[test]
    fn test_state_kind_clips_and_instances() {
        assert_eq!(StateKind::WallCling.animation_name(), "Cling");
        assert_eq!(StateKind::Dance.instantiate().kind(), StateKind::Dance);
    }
}

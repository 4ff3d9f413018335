//! Long-running effects: a ticking timer and a sheet that loads while open.

use std::sync::Arc;
use std::time::Duration;

use reflux::case_path;
use reflux::prelude::*;
use reflux::testing::TestStore;

#[derive(Debug, Clone, Default, PartialEq)]
struct Timer {
    running: bool,
    seconds: u32,
}

#[derive(Debug, Clone, PartialEq)]
enum TimerAction {
    Toggle,
    Tick,
}

#[derive(Debug, Hash, PartialEq, Eq)]
struct TimerId;

fn timer(clock: Arc<dyn Clock>) -> impl Reducer<State = Timer, Action = TimerAction> {
    Reduce::new(move |state: &mut Timer, action: TimerAction| match action {
        TimerAction::Toggle => {
            state.running = !state.running;
            if !state.running {
                return Effect::cancel(TimerId);
            }
            let clock = Arc::clone(&clock);
            Effect::run(move |send| async move {
                loop {
                    clock.sleep(Duration::from_secs(1)).await;
                    send.send(TimerAction::Tick);
                }
            })
            .cancellable(TimerId, true)
        }
        TimerAction::Tick => {
            state.seconds += 1;
            Effect::none()
        }
    })
}

#[tokio::test(start_paused = true)]
async fn timer_ticks_until_stopped() {
    let mut store = TestStore::new(Timer::default(), timer(Dependencies::test().clock))
        .with_timeout(Duration::from_secs(5));

    store.send(TimerAction::Toggle, |s| s.running = true);
    for second in 1..=3 {
        store
            .receive(TimerAction::Tick, |s| s.seconds = second)
            .await;
    }
    store.send(TimerAction::Toggle, |s| s.running = false);
    store.finish().await;
}

#[tokio::test(start_paused = true)]
async fn no_tick_is_delivered_after_stop() {
    let store = Store::new(Timer::default(), timer(Dependencies::test().clock));

    let running = store.send(TimerAction::Toggle);
    tokio::time::sleep(Duration::from_millis(2500)).await;
    store.send(TimerAction::Toggle);
    running.finish().await.unwrap();

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(
        store.state(),
        Timer {
            running: false,
            seconds: 2
        }
    );
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Sheet {
    loaded: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum SheetAction {
    Appeared,
    Loaded(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Screen {
    sheet: Option<Sheet>,
}

#[derive(Debug, Clone, PartialEq)]
enum ScreenAction {
    Present,
    Dismiss,
    Sheet(SheetAction),
}

#[derive(Debug, Hash, PartialEq, Eq)]
struct SheetLoad;

fn screen(clock: Arc<dyn Clock>) -> impl Reducer<State = Screen, Action = ScreenAction> {
    let sheet = Reduce::new(move |state: &mut Sheet, action: SheetAction| match action {
        SheetAction::Appeared => {
            let clock = Arc::clone(&clock);
            Effect::task(async move {
                clock.sleep(Duration::from_secs(2)).await;
                SheetAction::Loaded("details".into())
            })
            .cancellable(SheetLoad, true)
        }
        SheetAction::Loaded(text) => {
            state.loaded = Some(text);
            Effect::none()
        }
    });

    Reduce::new(|state: &mut Screen, action: ScreenAction| match action {
        ScreenAction::Present => {
            state.sheet = Some(Sheet::default());
            Effect::send(ScreenAction::Sheet(SheetAction::Appeared))
        }
        ScreenAction::Dismiss => {
            state.sheet = None;
            Effect::cancel(SheetLoad)
        }
        ScreenAction::Sheet(_) => Effect::none(),
    })
    .if_let(
        |state: &mut Screen| state.sheet.as_mut(),
        case_path!(ScreenAction::Sheet),
        sheet,
    )
}

#[tokio::test(start_paused = true)]
async fn sheet_loads_while_presented() {
    let mut store = TestStore::new(Screen::default(), screen(Dependencies::test().clock))
        .with_timeout(Duration::from_secs(5));

    store.send(ScreenAction::Present, |s| s.sheet = Some(Sheet::default()));
    store
        .receive(ScreenAction::Sheet(SheetAction::Appeared), |_| {})
        .await;
    store
        .receive(
            ScreenAction::Sheet(SheetAction::Loaded("details".into())),
            |s| {
                s.sheet = Some(Sheet {
                    loaded: Some("details".into()),
                })
            },
        )
        .await;
    store.finish().await;
}

#[tokio::test(start_paused = true)]
async fn dismissing_cancels_the_load() {
    let mut store = TestStore::new(Screen::default(), screen(Dependencies::test().clock));

    store.send(ScreenAction::Present, |s| s.sheet = Some(Sheet::default()));
    store
        .receive(ScreenAction::Sheet(SheetAction::Appeared), |_| {})
        .await;
    store.send(ScreenAction::Dismiss, |s| s.sheet = None);
    store.finish().await;
}

#[tokio::test]
async fn child_actions_without_child_state_change_nothing() {
    let mut store = TestStore::new(Screen::default(), screen(Dependencies::test().clock));
    let task = store.send(ScreenAction::Sheet(SheetAction::Loaded("late".into())), |_| {});
    assert!(task.is_empty());
    store.finish().await;
}

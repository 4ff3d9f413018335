use super::*;
use crate::case_path;
use crate::identified::{Identifiable, IdentifiedVec};

#[derive(Debug, Clone, Default, PartialEq)]
struct Counter {
    count: i32,
}

#[derive(Debug, Clone, PartialEq)]
enum CounterAction {
    Increment,
    Decrement,
}

fn counter() -> impl Reducer<State = Counter, Action = CounterAction> {
    Reduce::new(|state: &mut Counter, action: CounterAction| {
        match action {
            CounterAction::Increment => state.count += 1,
            CounterAction::Decrement => state.count -= 1,
        }
        Effect::none()
    })
}

#[test]
fn reduce_wraps_closure() {
    let reducer = counter();
    let mut state = Counter::default();
    reducer.reduce(&mut state, CounterAction::Increment);
    reducer.reduce(&mut state, CounterAction::Increment);
    reducer.reduce(&mut state, CounterAction::Decrement);
    assert_eq!(state.count, 1);
}

#[test]
fn empty_reducer_changes_nothing() {
    let reducer = EmptyReducer::<Counter, CounterAction>::new();
    let mut state = Counter { count: 3 };
    assert!(reducer.reduce(&mut state, CounterAction::Increment).is_none());
    assert_eq!(state.count, 3);
}

#[test]
fn combine_runs_in_declared_order() {
    let log = Reduce::new(|state: &mut Vec<&'static str>, _: ()| {
        state.push("first");
        Effect::none()
    })
    .combine(Reduce::new(|state: &mut Vec<&'static str>, _: ()| {
        state.push("second");
        Effect::none()
    }));

    let mut state = Vec::new();
    log.reduce(&mut state, ());
    assert_eq!(state, vec!["first", "second"]);
}

#[test]
fn combine_merges_effects() {
    let reducer = Reduce::new(|_: &mut (), n: u8| Effect::send(n))
        .combine(Reduce::new(|_: &mut (), n: u8| Effect::send(n + 1)));
    let effect = reducer.reduce(&mut (), 1);
    assert!(matches!(effect.kind, crate::effect::Kind::Merge(ref children) if children.len() == 2));
}

#[test]
fn combine_reducers_folds_many() {
    let step = |factor: i32| {
        Reduce::new(move |n: &mut i32, add: i32| {
            *n = *n * factor + add;
            Effect::none()
        })
        .boxed()
    };
    let chain: CombineReducers<i32, i32> = (1..=3).map(step).collect();
    assert_eq!(chain.len(), 3);

    let mut n = 0;
    chain.reduce(&mut n, 1);
    // ((0*1+1)*2+1)*3+1
    assert_eq!(n, 10);
}

#[derive(Debug, Clone, Default, PartialEq)]
struct TwoCounters {
    first: Counter,
    second: Counter,
}

#[derive(Debug, Clone, PartialEq)]
enum TwoCountersAction {
    First(CounterAction),
    Second(CounterAction),
}

#[test]
fn scope_routes_by_case() {
    let app = Scope::new(
        |s: &mut TwoCounters| &mut s.first,
        case_path!(TwoCountersAction::First),
        counter(),
    )
    .combine(Scope::new(
        |s: &mut TwoCounters| &mut s.second,
        case_path!(TwoCountersAction::Second),
        counter(),
    ));

    let mut state = TwoCounters::default();
    app.reduce(&mut state, TwoCountersAction::First(CounterAction::Increment));
    app.reduce(&mut state, TwoCountersAction::Second(CounterAction::Decrement));
    app.reduce(&mut state, TwoCountersAction::Second(CounterAction::Decrement));

    assert_eq!(state.first.count, 1);
    assert_eq!(state.second.count, -2);
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Screen {
    detail: Option<Counter>,
    events: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
enum ScreenAction {
    Open,
    Dismiss,
    Detail(CounterAction),
}

fn screen() -> impl Reducer<State = Screen, Action = ScreenAction> {
    Reduce::new(|state: &mut Screen, action: ScreenAction| {
        match action {
            ScreenAction::Open => state.detail = Some(Counter::default()),
            ScreenAction::Dismiss => state.detail = None,
            ScreenAction::Detail(_) => {
                let seen = state.detail.as_ref().map(|d| d.count);
                state.events.push(if seen == Some(1) { "parent saw 1" } else { "parent" });
            }
        }
        Effect::none()
    })
    .if_let(
        |state: &mut Screen| state.detail.as_mut(),
        case_path!(ScreenAction::Detail),
        counter(),
    )
}

#[test]
fn if_let_runs_child_before_parent() {
    let reducer = screen();
    let mut state = Screen::default();
    reducer.reduce(&mut state, ScreenAction::Open);
    reducer.reduce(&mut state, ScreenAction::Detail(CounterAction::Increment));
    assert_eq!(state.detail, Some(Counter { count: 1 }));
    assert_eq!(state.events, vec!["parent saw 1"]);
}

#[test]
fn if_let_skips_child_when_absent() {
    let reducer = screen();
    let mut state = Screen::default();
    reducer.reduce(&mut state, ScreenAction::Detail(CounterAction::Increment));
    assert_eq!(state.detail, None);
    assert_eq!(state.events, vec!["parent"]);

    reducer.reduce(&mut state, ScreenAction::Open);
    reducer.reduce(&mut state, ScreenAction::Dismiss);
    reducer.reduce(&mut state, ScreenAction::Detail(CounterAction::Decrement));
    assert_eq!(state.detail, None);
}

#[test]
fn if_let_after_a_clearing_reducer_skips_the_child() {
    let reducer = Reduce::new(|state: &mut Screen, action: ScreenAction| {
        if let ScreenAction::Detail(_) = action {
            state.detail = None;
        }
        Effect::none()
    })
    .combine(EmptyReducer::<Screen, ScreenAction>::new().if_let(
        |state: &mut Screen| state.detail.as_mut(),
        case_path!(ScreenAction::Detail),
        Reduce::new(|detail: &mut Counter, action: CounterAction| {
            detail.count += 1;
            Effect::send(action)
        }),
    ));

    let mut state = Screen {
        detail: Some(Counter { count: 7 }),
        events: Vec::new(),
    };
    let effect = reducer.reduce(&mut state, ScreenAction::Detail(CounterAction::Increment));

    assert!(effect.is_none());
    assert_eq!(state.detail, None);
    assert!(state.events.is_empty());
}

#[derive(Debug, Clone, PartialEq)]
struct Row {
    id: u32,
    counter: Counter,
}

impl Identifiable for Row {
    type Id = u32;
    fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ListAction {
    Row((u32, CounterAction)),
    Remove(u32),
}

fn row() -> impl Reducer<State = Row, Action = CounterAction> {
    Scope::new(
        |row: &mut Row| &mut row.counter,
        CasePath::new(Ok::<CounterAction, CounterAction>, |action: CounterAction| action),
        counter(),
    )
}

fn list() -> impl Reducer<State = IdentifiedVec<Row>, Action = ListAction> {
    Reduce::new(|rows: &mut IdentifiedVec<Row>, action: ListAction| {
        if let ListAction::Remove(id) = action {
            rows.remove(&id);
        }
        Effect::none()
    })
    .for_each(|rows| rows, case_path!(ListAction::Row), row())
}

fn rows(ids: &[u32]) -> IdentifiedVec<Row> {
    ids.iter()
        .map(|&id| Row {
            id,
            counter: Counter::default(),
        })
        .collect()
}

#[test]
fn for_each_addresses_element_by_id() {
    let reducer = list();
    let mut state = rows(&[1, 2, 3]);
    reducer.reduce(&mut state, ListAction::Row((2, CounterAction::Increment)));

    let counts: Vec<i32> = state.iter().map(|row| row.counter.count).collect();
    assert_eq!(counts, vec![0, 1, 0]);
}

#[test]
fn for_each_follows_moved_elements() {
    let reducer = list();
    let mut state = rows(&[1, 2, 3]);
    state.move_item(2, 0);
    reducer.reduce(&mut state, ListAction::Row((3, CounterAction::Decrement)));
    assert_eq!(state[0].id, 3);
    assert_eq!(state[0].counter.count, -1);
}

#[test]
fn for_each_ignores_removed_ids() {
    let reducer = list();
    let mut state = rows(&[1, 2]);
    reducer.reduce(&mut state, ListAction::Remove(2));
    let effect = reducer.reduce(&mut state, ListAction::Row((2, CounterAction::Increment)));
    assert!(effect.is_none());
    assert_eq!(state, rows(&[1]));
}

#[test]
fn for_each_after_a_removing_reducer_skips_the_element() {
    let reducer = Reduce::new(|rows: &mut IdentifiedVec<Row>, action: ListAction| {
        if let ListAction::Row((id, _)) = action {
            rows.remove(&id);
        }
        Effect::none()
    })
    .combine(EmptyReducer::<IdentifiedVec<Row>, ListAction>::new().for_each(
        |rows| rows,
        case_path!(ListAction::Row),
        Scope::new(
            |row: &mut Row| &mut row.counter,
            CasePath::new(Ok::<CounterAction, CounterAction>, |action: CounterAction| action),
            Reduce::new(|counter: &mut Counter, action: CounterAction| {
                counter.count += 1;
                Effect::send(action)
            }),
        ),
    ));

    let mut state = rows(&[1, 2]);
    let effect = reducer.reduce(&mut state, ListAction::Row((2, CounterAction::Increment)));

    assert!(effect.is_none());
    assert_eq!(state, rows(&[1]));
}

#[test]
#[tracing_test::traced_test]
fn traced_logs_actions_and_changes() {
    let reducer = counter().traced(ActionFormat::Full);
    let mut state = Counter::default();
    reducer.reduce(&mut state, CounterAction::Increment);
    assert_eq!(state.count, 1);
    assert!(logs_contain("received action"));
    assert!(logs_contain("Increment"));
}

#[test]
fn boxed_reducers_are_reducers() {
    let reducers: Vec<BoxReducer<Counter, CounterAction>> = vec![counter().boxed(), counter().boxed()];
    let mut state = Counter::default();
    for reducer in &reducers {
        reducer.reduce(&mut state, CounterAction::Increment);
    }
    assert_eq!(state.count, 2);
}

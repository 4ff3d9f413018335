//! A todo list: keyed child features, injected UUIDs and a debounced sort.

use std::time::Duration;

use reflux::case_path;
use reflux::prelude::*;
use reflux::testing::TestStore;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
struct Todo {
    id: Uuid,
    description: String,
    complete: bool,
}

impl Identifiable for Todo {
    type Id = Uuid;
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TodoAction {
    CheckBoxToggled,
    TextFieldChanged(String),
}

fn todo() -> impl Reducer<State = Todo, Action = TodoAction> {
    Reduce::new(|todo: &mut Todo, action: TodoAction| {
        match action {
            TodoAction::CheckBoxToggled => todo.complete = !todo.complete,
            TodoAction::TextFieldChanged(text) => todo.description = text,
        }
        Effect::none()
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Todos {
    todos: IdentifiedVec<Todo>,
}

#[derive(Debug, Clone, PartialEq)]
enum TodosAction {
    AddTodoButtonTapped,
    ClearCompletedButtonTapped,
    Delete(Uuid),
    SortCompletedTodos,
    Todo((Uuid, TodoAction)),
}

#[derive(Debug, Hash, PartialEq, Eq)]
struct TodoCompletion;

fn todos(deps: Dependencies) -> impl Reducer<State = Todos, Action = TodosAction> {
    Reduce::new(move |state: &mut Todos, action: TodosAction| match action {
        TodosAction::AddTodoButtonTapped => {
            state.todos.insert(
                0,
                Todo {
                    id: deps.uuid.generate(),
                    description: String::new(),
                    complete: false,
                },
            );
            Effect::none()
        }
        TodosAction::ClearCompletedButtonTapped => {
            state.todos.retain(|todo| !todo.complete);
            Effect::none()
        }
        TodosAction::Delete(id) => {
            state.todos.remove(&id);
            Effect::none()
        }
        TodosAction::SortCompletedTodos => {
            state.todos.sort_by(|a, b| a.complete.cmp(&b.complete));
            Effect::none()
        }
        TodosAction::Todo((_, TodoAction::CheckBoxToggled)) => {
            Effect::send(TodosAction::SortCompletedTodos).debounce(
                TodoCompletion,
                Duration::from_secs(1),
                deps.clock.clone(),
            )
        }
        TodosAction::Todo(_) => Effect::none(),
    })
    .for_each(|state: &mut Todos| &mut state.todos, case_path!(TodosAction::Todo), todo())
}

fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn todo_item(n: u128, description: &str, complete: bool) -> Todo {
    Todo {
        id: id(n),
        description: description.to_string(),
        complete,
    }
}

#[tokio::test]
async fn add_todos_with_injected_ids() {
    let mut store = TestStore::new(Todos::default(), todos(Dependencies::test()));

    store.send(TodosAction::AddTodoButtonTapped, |s| {
        s.todos.push(todo_item(0, "", false));
    });
    store.send(TodosAction::AddTodoButtonTapped, |s| {
        s.todos.insert(0, todo_item(1, "", false));
    });
    store.send(
        TodosAction::Todo((id(1), TodoAction::TextFieldChanged("Milk".into()))),
        |s| s.todos.get_mut(&id(1)).unwrap().description = "Milk".into(),
    );
    store.finish().await;
}

#[tokio::test(start_paused = true)]
async fn completing_a_todo_sorts_after_a_pause() {
    let state = Todos {
        todos: vec![todo_item(0, "Milk", false), todo_item(1, "Eggs", false)].into(),
    };
    let mut store = TestStore::new(state, todos(Dependencies::test()));

    store.send(TodosAction::Todo((id(0), TodoAction::CheckBoxToggled)), |s| {
        s.todos.get_mut(&id(0)).unwrap().complete = true;
    });
    tokio::time::advance(Duration::from_secs(1)).await;
    store
        .receive(TodosAction::SortCompletedTodos, |s| s.todos.move_item(0, 1))
        .await;
    store.finish().await;
}

#[tokio::test(start_paused = true)]
async fn toggling_twice_quickly_sorts_once() {
    let state = Todos {
        todos: vec![todo_item(0, "Milk", false), todo_item(1, "Eggs", false)].into(),
    };
    let mut store = TestStore::new(state, todos(Dependencies::test()));

    store.send(TodosAction::Todo((id(0), TodoAction::CheckBoxToggled)), |s| {
        s.todos.get_mut(&id(0)).unwrap().complete = true;
    });
    tokio::time::advance(Duration::from_millis(500)).await;
    store.send(TodosAction::Todo((id(0), TodoAction::CheckBoxToggled)), |s| {
        s.todos.get_mut(&id(0)).unwrap().complete = false;
    });
    tokio::time::advance(Duration::from_secs(1)).await;
    store.receive(TodosAction::SortCompletedTodos, |_| {}).await;
    store.finish().await;
}

#[tokio::test]
async fn clear_completed_and_delete() {
    let state = Todos {
        todos: vec![
            todo_item(0, "Milk", false),
            todo_item(1, "Eggs", true),
            todo_item(2, "Hand soap", false),
        ]
        .into(),
    };
    let mut store = TestStore::new(state, todos(Dependencies::test()));

    store.send(TodosAction::ClearCompletedButtonTapped, |s| {
        s.todos.remove(&id(1));
    });
    store.send(TodosAction::Delete(id(0)), |s| {
        s.todos.remove(&id(0));
    });
    assert_eq!(store.state().todos, vec![todo_item(2, "Hand soap", false)].into());
    store.finish().await;
}

use dropdesk_core::storage::{JsonFileStore, MemoryStore};
use dropdesk_core::tasks::{TaskList, TaskRecord, STORAGE_KEY};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(String),
    Toggle(usize),
    Delete(usize),
    DeleteUnknown,
}

// Operations reference existing tasks by position so they usually hit
fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => "[ a-z]{0,12}".prop_map(Op::Add),
        2 => any::<usize>().prop_map(Op::Toggle),
        1 => any::<usize>().prop_map(Op::Delete),
        1 => Just(Op::DeleteUnknown),
    ]
}

fn apply(list: &mut TaskList<MemoryStore>, op: &Op) {
    match op {
        Op::Add(text) => {
            list.add_task(text).unwrap();
        }
        Op::Toggle(pos) if !list.is_empty() => {
            let id = list.tasks()[pos % list.len()].id;
            list.toggle_task(id).unwrap();
        }
        Op::Delete(pos) if !list.is_empty() => {
            let id = list.tasks()[pos % list.len()].id;
            list.delete_task(id).unwrap();
        }
        Op::DeleteUnknown => {
            list.delete_task(-1).unwrap();
        }
        _ => {}
    }
}

proptest! {
    /// Property: storage always mirrors the in-memory list after any operation
    #[test]
    fn prop_storage_mirrors_list(ops in prop::collection::vec(arb_op(), 0..40)) {
        let store = MemoryStore::new();
        let mut list = TaskList::initialize(store.clone()).unwrap();

        for op in &ops {
            apply(&mut list, op);
            prop_assert_eq!(store.peek(STORAGE_KEY), Some(list.to_json().unwrap()));
        }
    }

    /// Property: ids stay unique, texts are trimmed and never blank
    #[test]
    fn prop_ids_unique_and_texts_clean(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut list = TaskList::initialize(MemoryStore::new()).unwrap();
        for op in &ops {
            apply(&mut list, op);
        }

        let mut ids: Vec<i64> = list.tasks().iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), list.len());

        for task in list.tasks() {
            prop_assert!(!task.text.is_empty());
            prop_assert_eq!(task.text.trim(), task.text.as_str());
        }
    }

    /// Property: rehydrating from the stored form yields an equal list
    #[test]
    fn prop_rehydrate_roundtrip(ops in prop::collection::vec(arb_op(), 0..40)) {
        let store = MemoryStore::new();
        let mut list = TaskList::initialize(store.clone()).unwrap();
        for op in &ops {
            apply(&mut list, op);
        }
        let original: Vec<TaskRecord> = list.tasks().to_vec();

        let raw = store.peek(STORAGE_KEY).unwrap();
        let rehydrated = TaskList::initialize(MemoryStore::with_value(STORAGE_KEY, &raw)).unwrap();
        prop_assert_eq!(rehydrated.tasks(), original.as_slice());
    }

    /// Property: toggling twice restores the original flag
    #[test]
    fn prop_double_toggle_is_identity(texts in prop::collection::vec("[a-z]{1,8}", 1..10), pick in any::<usize>()) {
        let mut list = TaskList::initialize(MemoryStore::new()).unwrap();
        for text in &texts {
            list.add_task(text).unwrap();
        }
        let before = list.to_json().unwrap();
        let id = list.tasks()[pick % list.len()].id;

        list.toggle_task(id).unwrap();
        list.toggle_task(id).unwrap();

        prop_assert_eq!(list.to_json().unwrap(), before);
    }
}

#[test]
fn file_store_roundtrip_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let snapshot = {
        let mut list = TaskList::initialize(JsonFileStore::open(&path).unwrap()).unwrap();
        list.add_task("buy milk").unwrap();
        let id = list.add_task("walk dog").unwrap().unwrap().id;
        list.toggle_task(id).unwrap();
        list.tasks().to_vec()
    };

    let list = TaskList::initialize(JsonFileStore::open(&path).unwrap()).unwrap();
    assert_eq!(list.tasks(), snapshot.as_slice());
    assert_eq!(list.remaining(), 1);
}

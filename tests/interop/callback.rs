use super::{Handle, host};
use jsinterop::bridge::sandbox::Value;
use jsinterop::{CallbackRegistry, HostCallable, HostError, Sandbox};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_click_scenario() {
    let seen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    let handler = jsinterop::register(move |args| {
        let [kind, code, detail] = args else {
            panic!("expected three arguments, got {}", args.len());
        };
        *sink.borrow_mut() = Some((
            kind.string(),
            code.int(),
            detail.get("k").string(),
        ));
    });

    let target = host(json!({}));
    target.set("onclick", &handler).unwrap();

    // The host dispatches the stored handler the way an event loop would
    let stored = target.get("onclick");
    let detail = Value::object([("k", Value::from("v"))]);
    let result = Sandbox::invoke(
        stored.raw(),
        &[Value::from("click"), Value::from(42), detail],
    )
    .unwrap();
    assert!(matches!(result, Value::Undefined));

    let (kind, code, k) = seen.borrow_mut().take().unwrap();
    assert_eq!(kind, Ok("click".to_string()));
    assert_eq!(code, Ok(42));
    assert_eq!(k, Ok("v".to_string()));
}

#[test]
fn test_guest_call_reaches_guest_callback() {
    let count = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&count);
    let callable = HostCallable::<Sandbox>::new(move |args| {
        *counter.borrow_mut() += args.len();
    });

    let obj = host(json!({}));
    obj.set("notify", &callable).unwrap();
    let result = obj.call("notify", &[&1, &"two", &()]).unwrap();
    assert!(result.is_undefined());
    assert_eq!(*count.borrow(), 3);
}

#[test]
fn test_reentrant_invocations_keep_their_own_arguments() {
    let log = Rc::new(RefCell::new(Vec::new()));

    let inner_log = Rc::clone(&log);
    let inner = HostCallable::<Sandbox>::new(move |args| {
        let label = args[0].must_string();
        inner_log.borrow_mut().push(format!("inner:{label}"));
    });

    let outer_log = Rc::clone(&log);
    let inner_fn = inner.handle().clone();
    let outer = HostCallable::<Sandbox>::new(move |args| {
        let before = args[0].must_string();
        outer_log.borrow_mut().push(format!("outer-start:{before}"));
        Sandbox::invoke(inner_fn.raw(), &[Value::from("nested")]).unwrap();
        // Still our own argument after the nested call returned
        let after = args[0].must_string();
        outer_log.borrow_mut().push(format!("outer-end:{after}"));
    });

    Sandbox::invoke(outer.handle().raw(), &[Value::from("top")]).unwrap();
    assert_eq!(
        *log.borrow(),
        ["outer-start:top", "inner:nested", "outer-end:top"]
    );
}

#[test]
fn test_callback_can_reenter_itself() {
    let depth = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&depth);
    let target = host(json!({}));
    let receiver = target.clone();
    let callable = HostCallable::<Sandbox>::new(move |args| {
        let n = args[0].must_int();
        sink.borrow_mut().push(n);
        if n > 0 {
            receiver.call("recurse", &[&(n - 1)]).unwrap();
        }
        assert_eq!(args[0].must_int(), n);
    });
    target.set("recurse", &callable).unwrap();

    target.call("recurse", &[&3]).unwrap();
    assert_eq!(*depth.borrow(), [3, 2, 1, 0]);
}

#[test]
fn test_callback_mutations_are_visible_to_the_caller() {
    let state = host(json!({"clicks": 0}));
    let shared = state.clone();
    let callable = HostCallable::<Sandbox>::new(move |_| {
        let clicks = shared.get("clicks").int_or(0);
        shared.set("clicks", &(clicks + 1)).unwrap();
    });
    let f = callable.handle();
    Sandbox::invoke(f.raw(), &[]).unwrap();
    Sandbox::invoke(f.raw(), &[]).unwrap();
    assert_eq!(state.get("clicks").must_int(), 2);
}

#[test]
fn test_released_registration_is_a_dangling_callback() {
    let mut registry = CallbackRegistry::<Sandbox>::new();
    let (id, function) = registry.register(|_| {});
    let target = host(json!({}));
    target.set("handler", &function).unwrap();

    assert!(target.call("handler", &[]).is_ok());
    assert!(registry.release(id));
    assert!(matches!(
        target.call("handler", &[]),
        Err(HostError::Released)
    ));
    // The host still holds the function value itself
    assert!(target.get("handler").is_function());
}

#[test]
fn test_registry_hands_out_handles() {
    let mut registry = CallbackRegistry::<Sandbox>::new();
    let (id, function) = registry.register(|_| {});
    assert!(registry.handle(id).unwrap().strict_equals(&function));
    assert_eq!(registry.len(), 1);

    let extra = registry.insert(HostCallable::new(|_: &[Handle]| {}));
    assert_ne!(extra, id);
    assert_eq!(registry.len(), 2);
}

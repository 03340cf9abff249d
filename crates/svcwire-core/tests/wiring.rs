use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use svcwire_core::{
    component, provider, wire, ChangeNotifier, Component, Element, Instance, Observable, Props,
    Registry, RenderOptions, Root, WireError,
};

/// Renders "name=value" for each prop, "name=<absent>" for absent entries.
fn show(label: &'static str) -> Arc<dyn Component> {
    component(label, move |_cx, props: &Props| {
        let line = props
            .names()
            .map(|n| match props.get_as::<String>(n) {
                Some(v) => format!("{n}={v}"),
                None => format!("{n}=<absent>"),
            })
            .collect::<Vec<_>>()
            .join(",");
        Ok(Element::text(format!("{label}:{line}")))
    })
}

fn service(v: &str) -> Arc<String> {
    Arc::new(v.to_string())
}

/// Intermediate layer that knows nothing about services.
fn layout(children: Vec<Element>) -> Element {
    let wrapper = component("Layout", move |_cx, _props| Ok(Element::list(children.clone())));
    Element::component(wrapper, Props::new())
}

#[test]
fn descendant_receives_only_declared_services() {
    let instance = Instance::new();
    let services = Arc::new(
        Registry::new()
            .with("a", service("A"))
            .with("b", service("B")),
    );
    let app = layout(vec![Element::component(
        instance.wire(["a", "c"], show("Leaf")),
        Props::new(),
    )]);

    let mut root = Root::with_instance(&instance, services, app);
    let out = root.render().unwrap();

    assert_eq!(out.texts(), vec!["Leaf:a=A,c=<absent>"]);
}

#[test]
fn republishing_reaches_every_consumer() {
    let instance = Instance::new();
    let app = layout(vec![
        Element::component(instance.wire(["a"], show("One")), Props::new()),
        layout(vec![Element::component(
            instance.wire(["a"], show("Two")),
            Props::new(),
        )]),
    ]);

    let services = Arc::new(Registry::new().with("a", service("A")));
    let mut root = Root::with_instance(&instance, services, app);
    assert_eq!(root.render().unwrap().texts(), vec!["One:a=A", "Two:a=A"]);

    assert!(root.publish(Arc::new(Registry::new().with("a", service("A2")))));
    assert_eq!(root.revision(), 1);
    assert!(root.is_dirty());

    let out = root.render_if_dirty().unwrap().expect("dirty root renders");
    assert_eq!(out.texts(), vec!["One:a=A2", "Two:a=A2"]);
    assert!(root.render_if_dirty().unwrap().is_none());
}

#[test]
fn explicit_prop_shadows_injected_service() {
    let instance = Instance::new();
    let app = Element::component(
        instance.wire(["a", "b"], show("Leaf")),
        Props::new().with("a", String::from("explicit")),
    );

    let services = Arc::new(Registry::new().with("a", service("A")).with("b", service("B")));
    let mut root = Root::with_instance(&instance, services, app);

    assert_eq!(root.render().unwrap().texts(), vec!["Leaf:a=explicit,b=B"]);
}

struct Backend(&'static str);

#[test]
fn explicit_service_handle_shadows_injected_one() {
    let instance = Instance::new();
    let leaf = component("Leaf", |_cx, props: &Props| {
        let backend = props.require::<Backend>("backend")?;
        Ok(Element::text(backend.0))
    });
    let app = Element::component(
        instance.wire(["backend"], leaf),
        Props::new().with_service("backend", Arc::new(Backend("mock"))),
    );

    let services = Arc::new(Registry::new().with("backend", Arc::new(Backend("real"))));
    let mut root = Root::with_instance(&instance, services, app);

    assert_eq!(root.render().unwrap().texts(), vec!["mock"]);
}

#[test]
fn nested_provider_overrides_only_its_subtree() {
    let instance = Instance::new();
    let inner = Arc::new(Registry::new().with("a", service("inner")));
    let app = Element::list([
        Element::component(instance.wire(["a"], show("Outer")), Props::new()),
        instance.provider(
            inner,
            layout(vec![Element::component(
                instance.wire(["a"], show("Inner")),
                Props::new(),
            )]),
        ),
        Element::component(instance.wire(["a"], show("After")), Props::new()),
    ]);

    let services = Arc::new(Registry::new().with("a", service("outer")));
    let mut root = Root::with_instance(&instance, services, app);

    assert_eq!(
        root.render().unwrap().texts(),
        vec!["Outer:a=outer", "Inner:a=inner", "After:a=outer"]
    );
}

#[test]
fn consumer_outside_any_provider_sees_empty_registry() {
    let mut scopes = svcwire_core::Scopes::new();
    let options = RenderOptions::default();
    let mut cx = svcwire_core::RenderCx::new(&mut scopes, &options);

    let instance = Instance::new();
    let el = Element::component(instance.wire(["a"], show("Lonely")), Props::new());

    let out = cx.render(&el).unwrap();
    assert_eq!(out.texts(), vec!["Lonely:a=<absent>"]);
    assert!(instance.services(&cx).is_some_and(|r| r.is_empty()));
}

#[test]
fn instances_do_not_see_each_other() {
    let first = Instance::new();
    let second = Instance::new();

    let app = second.provider(
        Arc::new(Registry::new().with("a", service("second"))),
        Element::list([
            Element::component(first.wire(["a"], show("First")), Props::new()),
            Element::component(second.wire(["a"], show("Second")), Props::new()),
        ]),
    );

    let services = Arc::new(Registry::new().with("a", service("first")));
    let mut root = Root::with_instance(&first, services, app);
    assert_eq!(root.render().unwrap().texts(), vec!["First:a=first", "Second:a=second"]);
}

#[test]
fn render_prop_gets_filtered_services_only() {
    let instance = Instance::new();
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let consumer = instance.wire_render(["b"], move |services: &Props| {
        *sink.lock() = services.names().map(str::to_string).collect();
        let b = services.require::<String>("b")?;
        Ok(Element::text(format!("b is {b}")))
    });
    let app = Element::component(consumer, Props::new().with("a", String::from("ignored")));

    let services = Arc::new(Registry::new().with("a", service("A")).with("b", service("B")));
    let mut root = Root::with_instance(&instance, services, app);

    assert_eq!(root.render().unwrap().texts(), vec!["b is B"]);
    assert_eq!(*seen.lock(), vec!["b".to_string()]);
}

#[test]
fn shared_instance_free_functions_wire_together() {
    let app = provider(
        Arc::new(Registry::new().with("greeting", service("hi"))),
        Element::component(wire(["greeting"], show("Hello")), Props::new()),
    );

    let mut root = Root::new(Arc::new(Registry::new()), app);
    assert_eq!(root.render().unwrap().texts(), vec!["Hello:greeting=hi"]);
}

struct Counter {
    notifier: ChangeNotifier,
    value: AtomicUsize,
}

impl Counter {
    fn bump(&self) {
        self.value.fetch_add(1, Ordering::SeqCst);
        self.run_change_listeners();
    }
}

impl Observable for Counter {
    fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }
}

#[test]
fn service_change_invalidates_root() {
    let instance = Instance::new();
    let counter = Arc::new(Counter {
        notifier: ChangeNotifier::new(),
        value: AtomicUsize::new(0),
    });

    let label = component("CounterLabel", |_cx, props: &Props| {
        let counter = props.require::<Counter>("counter")?;
        Ok(Element::text(format!("count={}", counter.value.load(Ordering::SeqCst))))
    });
    let app = Element::component(instance.wire(["counter"], label), Props::new());

    let services = Arc::new(Registry::new().with("counter", counter.clone()));
    let mut root = Root::with_instance(&instance, services, app);
    let invalidator = root.invalidator();
    let unsubscribe = counter.add_change_listener(Arc::new(move || invalidator.invalidate()));

    let first = root.render_if_dirty().unwrap().map(ToString::to_string);
    assert_eq!(first.as_deref(), Some("count=0"));
    assert!(root.render_if_dirty().unwrap().is_none());

    counter.bump();
    let bumped = root.render_if_dirty().unwrap().map(ToString::to_string);
    assert_eq!(bumped.as_deref(), Some("count=1"));

    unsubscribe.unsubscribe();
    counter.bump();
    assert!(root.render_if_dirty().unwrap().is_none());
}

#[test]
fn publishing_same_registry_is_not_a_change() {
    let instance = Instance::new();
    let services = Arc::new(Registry::new());
    let mut root = Root::with_instance(&instance, services.clone(), Element::text("static"));

    let notified = Arc::new(AtomicUsize::new(0));
    let n = notified.clone();
    let _unsub = root.add_change_listener(Arc::new(move || {
        n.fetch_add(1, Ordering::SeqCst);
    }));

    root.render().unwrap();
    assert!(!root.publish(services));
    assert!(!root.is_dirty());
    assert_eq!(root.revision(), 0);

    assert!(root.publish(Arc::new(Registry::new())));
    assert_eq!(notified.load(Ordering::SeqCst), 1);
}

#[test]
fn set_app_marks_root_dirty() {
    let instance = Instance::new();
    let mut root = Root::with_instance(&instance, Arc::new(Registry::new()), Element::text("v1"));
    root.render().unwrap();

    root.set_app(Element::text("v2"));
    assert_eq!(root.render_if_dirty().unwrap().map(ToString::to_string).as_deref(), Some("v2"));
}

#[test]
fn runaway_recursion_hits_depth_limit() {
    fn nest(depth: usize) -> Element {
        let inner = component("Nest", move |_cx, _props| Ok(nest(depth + 1)));
        Element::component(inner, Props::new())
    }

    let instance = Instance::new();
    let mut root = Root::with_instance(&instance, Arc::new(Registry::new()), nest(0))
        .with_options(RenderOptions {
            max_depth: 16,
            log_missing: false,
        });

    let err = root.render().unwrap_err();
    assert!(matches!(err, WireError::DepthExceeded { limit: 16, .. }));
    assert!(root.is_dirty());
    assert!(root.last_rendered().is_none());
}

#[test]
fn component_errors_propagate() {
    let failing = component("Broken", |_cx, _props| {
        Err(WireError::component("Broken", anyhow::anyhow!("boom")))
    });
    let instance = Instance::new();
    let mut root = Root::with_instance(
        &instance,
        Arc::new(Registry::new()),
        Element::component(failing, Props::new()),
    );

    let err = root.render().unwrap_err();
    assert_eq!(err.to_string(), "component error [Broken]: boom");
}

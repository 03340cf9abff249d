use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use svcwire_core::logging::init_from_config;
use svcwire_core::{
    component, provider, wire, ChangeNotifier, Element, Observable, Props, Registry, Root,
    WireConfig,
};

/// Mutable app state other parts of the tree react to.
struct CounterService {
    notifier: ChangeNotifier,
    value: AtomicI64,
}

impl CounterService {
    #[inline]
    fn new() -> Self {
        Self {
            notifier: ChangeNotifier::new(),
            value: AtomicI64::new(0),
        }
    }

    fn increment(&self) {
        self.value.fetch_add(1, Ordering::SeqCst);
        self.run_change_listeners();
    }

    #[inline]
    fn get(&self) -> i64 {
        self.value.load(Ordering::SeqCst)
    }
}

impl Observable for CounterService {
    fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }
}

struct Greeter {
    greeting: String,
}

fn app() -> Element {
    let counter_label = wire(
        ["counter"],
        component("CounterLabel", |_cx, props: &Props| {
            let counter = props.require::<CounterService>("counter")?;
            Ok(Element::text(format!("clicks: {}", counter.get())))
        }),
    );

    // "clock" is never registered: the component falls back.
    let greeting = wire(
        ["greeter", "clock"],
        component("Greeting", |_cx, props: &Props| {
            let greeting = props
                .get_as::<Greeter>("greeter")
                .map(|g| g.greeting.clone())
                .unwrap_or_else(|| "hello".to_string());
            let when = if props.is_absent("clock") { "now" } else { "later" };
            Ok(Element::text(format!("{greeting} ({when})")))
        }),
    );

    let toolbar = component("Toolbar", move |_cx, _props| {
        Ok(Element::list([
            Element::component(greeting.clone(), Props::new()),
            Element::component(counter_label.clone(), Props::new()),
        ]))
    });

    let localized = Arc::new(Registry::new().with(
        "greeter",
        Arc::new(Greeter {
            greeting: "bonjour".to_string(),
        }),
    ));

    Element::list([
        Element::component(toolbar.clone(), Props::new()),
        provider(localized, Element::component(toolbar, Props::new())),
    ])
}

fn main() -> anyhow::Result<()> {
    let cfg = WireConfig::load_or_default("svcwire.toml")?;
    let _ = init_from_config(&cfg);

    let counter = Arc::new(CounterService::new());
    let services = Arc::new(
        Registry::new()
            .with("counter", counter.clone())
            .with(
                "greeter",
                Arc::new(Greeter {
                    greeting: "hi".to_string(),
                }),
            ),
    );

    let mut root = Root::new(services, app()).with_options(cfg.render.clone());

    let invalidator = root.invalidator();
    let unsubscribe = counter.add_change_listener(Arc::new(move || invalidator.invalidate()));

    for step in 0..3 {
        if let Some(out) = root.render_if_dirty()? {
            log::info!("frame {step}:\n{out}");
        }
        counter.increment();
    }

    // Swapping the root registry re-renders every consumer with the new services.
    root.publish(Arc::new(
        Registry::new()
            .with("counter", counter.clone())
            .with(
                "greeter",
                Arc::new(Greeter {
                    greeting: "hey".to_string(),
                }),
            ),
    ));
    if let Some(out) = root.render_if_dirty()? {
        log::info!("after republish:\n{out}");
    }

    unsubscribe.unsubscribe();
    Ok(())
}

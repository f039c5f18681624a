//! Console demo of the view-model presenter
//!
//! Shows a page and a dialog through a console view host, closes them and
//! awaits the navigation callbacks. Pass a JSON settings file as the first
//! argument to override the presenter settings.

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mv_core::metadata::keys::VIEW_MODEL;
use mv_core::{
    MetadataContext, NavigationContext, NavigationDispatcher, NavigationType, View, ViewInitializer,
    ViewMappingRegistry, ViewModelBase, ViewModelRef, ViewType,
};
use mv_presenter::mediator::{CloseDecision, ShowDecision, ViewHost};
use mv_presenter::{
    default_presenter, NavigationMediatorFactory, PresenterSettings, ViewHostMediatorFactory, WindowPresenter,
};

/// Prints what a real UI toolkit would do and keeps track of open views
#[derive(Default)]
struct ConsoleHost {
    open: Mutex<Vec<View>>,
}

impl ViewHost for ConsoleHost {
    fn show(&self, view: &View, context: &NavigationContext) -> anyhow::Result<ShowDecision> {
        println!("  [host] show {} as {} ({:?})", view.initializer.view_type, context.navigation_type, context.mode);
        self.open.lock().push(view.clone());
        Ok(ShowDecision::Shown)
    }

    fn activate(&self, view: &View, _context: &NavigationContext) -> anyhow::Result<ShowDecision> {
        println!("  [host] activate {}", view.initializer.view_type);
        Ok(ShowDecision::Shown)
    }

    fn close(&self, view: &View, _context: &NavigationContext) -> anyhow::Result<CloseDecision> {
        println!("  [host] close {}", view.initializer.view_type);
        self.open.lock().retain(|open| open.id != view.id);
        Ok(CloseDecision::Closed)
    }
}

fn request(view_model: &ViewModelRef) -> MetadataContext {
    MetadataContext::new().with(&VIEW_MODEL, view_model.clone())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = match std::env::args().nth(1) {
        Some(path) => PresenterSettings::load(path)?,
        None => PresenterSettings::default(),
    };
    info!("Starting presenter demo with {:?}", settings);

    let dispatcher = Arc::new(NavigationDispatcher::new());
    let views = Arc::new(ViewMappingRegistry::new());
    views.add_mapping(ViewInitializer::new("main-page", ViewType::new("MainPage"), "MainViewModel"));
    views.add_mapping(ViewInitializer::new(
        "settings-dialog",
        ViewType::new("SettingsDialog").with_supertype("Window"),
        "SettingsViewModel",
    ));

    let host = Arc::new(ConsoleHost::default());
    let bundle = default_presenter(&dispatcher, views.clone(), &settings);
    bundle.mediator_presenter.add_factory(Arc::new(ViewHostMediatorFactory::new(
        NavigationType::Page,
        host.clone(),
        dispatcher.clone(),
    )));

    let windows = Arc::new(WindowPresenter::new(views, settings.window_presenter_priority));
    dispatcher.add_listener(windows.clone());
    let window_factory = ViewHostMediatorFactory::new(NavigationType::Window, host.clone(), dispatcher.clone());
    let _registration = windows.register(ViewType::new("Window"), false, 0, move |vm, initializer, metadata| {
        window_factory.try_create(vm, initializer, metadata)
    });
    bundle.presenter.add_presenter(windows);

    let main_vm = ViewModelBase::new("MainViewModel").into_ref();
    let settings_vm = ViewModelBase::new("SettingsViewModel").into_ref();

    println!("Showing {:?}", main_vm);
    let main = bundle.presenter.show(&request(&main_vm))?;
    info!("Main page shown: {:?}", main.showing_callback.wait().await);

    println!("Showing {:?}", settings_vm);
    let dialog = bundle.presenter.show(&request(&settings_vm))?;
    info!(
        "Settings dialog shown through '{}': {:?}",
        dialog.result.presenter.as_deref().unwrap_or("?"),
        dialog.showing_callback.wait().await
    );
    println!("Open navigations: {}", dispatcher.journal().entries().len());

    for view_model in [&settings_vm, &main_vm] {
        println!("Closing {:?}", view_model);
        for closing in bundle.presenter.try_close(&request(view_model))? {
            info!("Close accepted: {:?}", closing.closing_callback.wait().await);
        }
    }

    info!("Dialog close callback: {:?}", dialog.close_callback.wait().await);
    info!("Main close callback: {:?}", main.close_callback.wait().await);
    println!(
        "Open navigations: {}, open views: {}",
        dispatcher.journal().entries().len(),
        host.open.lock().len()
    );
    Ok(())
}

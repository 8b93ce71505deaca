//! Page host: owns the current route and mounts the page that listens for commands.

mod detect;

pub use detect::{DetectForm, DetectPage, Disease, FormFocus};

use crate::command::routes;
use crate::log_debug;
use crate::router::{CommandRouter, Navigator, PageRegistration};

struct Mounted {
    page: DetectPage,
    // Held for its Drop, which clears the router slot.
    _registration: PageRegistration,
}

pub struct PageHost {
    router: CommandRouter,
    route: String,
    mounted: Option<Mounted>,
}

impl PageHost {
    pub fn new(router: CommandRouter, initial_route: &str) -> Self {
        let mut host = Self {
            router,
            route: String::new(),
            mounted: None,
        };
        host.mount(initial_route);
        host
    }

    pub fn current_route(&self) -> &str {
        &self.route
    }

    /// Snapshot of the detect form, when the detect page is mounted.
    pub fn detect_form(&self) -> Option<DetectForm> {
        self.mounted.as_ref().map(|mounted| mounted.page.form())
    }

    fn mount(&mut self, route: &str) {
        // Unmount first so the old registration cannot clear the new one.
        self.mounted = None;
        self.route = route.to_string();
        if route == routes::DETECT {
            let page = DetectPage::new();
            let registration = self.router.register(page.handler());
            self.mounted = Some(Mounted {
                page,
                _registration: registration,
            });
        }
        log_debug(&format!("page mounted for route {route}"));
    }
}

impl Navigator for PageHost {
    fn navigate(&mut self, route: &str) {
        if route == self.route {
            return;
        }
        self.mount(route);
    }
}

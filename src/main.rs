use leptos::prelude::*;
use reservation_sandbox::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App);
}

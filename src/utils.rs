/// Group numeric digits to facilitate reading long numbers
pub fn group_digits<F: std::fmt::Display>(n: F) -> String {
    use numsep::{separate, Locale};
    separate(n, Locale::English)
}


pub mod timing {

    use super::group_digits;
    use std::time::Instant;

    /// Logs the time taken by successive stages of a computation
    pub struct Progress {
        previous: Instant,
        stage: String,
    }

    impl Progress {

        #[allow(clippy::new_without_default)]
        pub fn new() -> Self { Self { previous: Instant::now(), stage: String::new() } }

        /// Log message, start timer.
        pub fn start(&mut self, message: &str) {
            log::info!("{message} ...");
            self.stage = message.into();
            self.start_timer();
        }

        /// Log time elapsed since last start or done
        pub fn done(&mut self) {
            log::info!("{}: {} ms", self.stage, group_digits(self.previous.elapsed().as_millis()));
            self.start_timer();
        }

        fn start_timer(&mut self) { self.previous = Instant::now() }
    }
}

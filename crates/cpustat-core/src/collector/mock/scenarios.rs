//! Pre-built mock filesystem scenarios for testing.
//!
//! All scenarios use the default roots `/proc` and `/sys/devices/system/cpu`.

use super::filesystem::MockFs;

const PROC_STAT: &str = "/proc/stat";
const SYS_CPU: &str = "/sys/devices/system/cpu";

impl MockFs {
    /// Quad-core machine with cpufreq on every core.
    ///
    /// Bounds are 800000..3600000 kHz on all cores; current frequencies are
    /// 1800000, 3600000, 900000 and 2700000 (ratios 0.5, 1.0, 0.25, 0.75).
    pub fn typical_system() -> Self {
        let fs = Self::new();

        fs.set_stat(
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );
        fs.add_file(format!("{}/online", SYS_CPU), "0-3\n");

        for (cpu, cur) in [(0, 1800000), (1, 3600000), (2, 900000), (3, 2700000)] {
            fs.add_cpufreq(SYS_CPU, cpu, Some(800000), Some(3600000), Some(cur));
        }

        fs
    }

    /// Virtual machine without a cpufreq driver: `/proc/stat` and the online
    /// list exist, no `scaling_*` files do.
    pub fn no_cpufreq() -> Self {
        let fs = Self::new();

        fs.set_stat(
            "\
cpu  4000 0 1000 15000 0 0 0 0 0 0
cpu0 2000 0 500 7500 0 0 0 0 0 0
cpu1 2000 0 500 7500 0 0 0 0 0 0
ctxt 120000
btime 1700000000
",
        );
        fs.add_file(format!("{}/online", SYS_CPU), "0-1\n");

        fs
    }

    /// Online list `0-2,4` where core 1 lacks `scaling_max_freq` and core 3
    /// is offline. Only cores 0, 2 and 4 have complete bounds.
    pub fn partial_cpufreq() -> Self {
        let fs = Self::new();

        fs.set_stat(
            "\
cpu  800 0 400 8000 100 0 0 0 0 0
cpu0 200 0 100 2000 25 0 0 0 0 0
cpu1 200 0 100 2000 25 0 0 0 0 0
cpu2 200 0 100 2000 25 0 0 0 0 0
cpu4 200 0 100 2000 25 0 0 0 0 0
",
        );
        fs.add_file(format!("{}/online", SYS_CPU), "0-2,4\n");

        fs.add_cpufreq(SYS_CPU, 0, Some(400000), Some(2000000), Some(1000000));
        fs.add_cpufreq(SYS_CPU, 1, Some(400000), None, Some(1500000));
        fs.add_cpufreq(SYS_CPU, 2, Some(400000), Some(2000000), Some(2000000));
        fs.add_cpufreq(SYS_CPU, 4, Some(400000), Some(2000000), Some(500000));

        fs
    }

    /// Two cores with different maxima: cpu0 runs at 1000 of 2000,
    /// cpu1 at 3000 of 3000. Aggregate frequency is 2000, ratio 0.75.
    pub fn hybrid_cores() -> Self {
        let fs = Self::new();

        fs.set_stat(
            "\
cpu  300 0 100 1600 0 0 0 0 0 0
cpu0 100 0 50 850 0 0 0 0 0 0
cpu1 200 0 50 750 0 0 0 0 0 0
",
        );
        fs.add_file(format!("{}/online", SYS_CPU), "0-1\n");

        fs.add_cpufreq(SYS_CPU, 0, Some(500), Some(2000), Some(1000));
        fs.add_cpufreq(SYS_CPU, 1, Some(1000), Some(3000), Some(3000));

        fs
    }

    /// Replaces `/proc/stat`.
    pub fn set_stat(&self, content: &str) {
        self.add_file(PROC_STAT, content);
    }

    /// Replaces `scaling_cur_freq` of core `cpu`.
    pub fn set_cur_freq(&self, cpu: u32, freq: u64) {
        self.add_file(
            format!("{}/cpu{}/cpufreq/scaling_cur_freq", SYS_CPU, cpu),
            format!("{}\n", freq),
        );
    }
}

//! Emulated process.
//!
//! Process-level emulation for running one user program without an OS. This module
//! provides:
//! 1. **Identity:** Process ids, credentials, hostname and working directory.
//! 2. **Startup:** Places the loaded image, builds the initial stack (strings, argv,
//!    envp, auxiliary vector, argc) and seeds the architecture's entry registers.
//! 3. **Syscalls:** Looks up the descriptor for a call number, runs it and encodes the
//!    outcome through the architecture's return convention.
//! 4. **Persistence:** Break, stack and mmap bookkeeping survive checkpoints; a restored
//!    process skips startup.

/// Loaded program image handed over by the external loader.
pub mod image;

/// Guest OS personalities.
pub mod os;

use std::collections::BTreeMap;
use std::marker::PhantomData;

use tracing::{debug, info, warn};

use crate::common::error::{CheckpointError, ProcessError, SyscallError};
use crate::config::ProcessConfig;
use crate::core::context::ThreadContext;
use crate::isa::Isa;
use crate::sim::checkpoint::{Checkpoint, CheckpointOut, Serializable};
use crate::syscall::desc::{SyscallContext, SyscallDesc, SyscallEntry, SyscallTable};
use crate::syscall::ret::{SyscallReturn, set_syscall_return};

use self::image::LoadedImage;
use self::os::OsPersonality;

/// Auxiliary vector tags placed on the initial stack.
mod auxv {
    pub const AT_NULL: u64 = 0;
    pub const AT_PAGESZ: u64 = 6;
    pub const AT_ENTRY: u64 = 9;
    pub const AT_UID: u64 = 11;
    pub const AT_EUID: u64 = 12;
    pub const AT_GID: u64 = 13;
    pub const AT_EGID: u64 = 14;
}

/// Kernel identity reported by `uname`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UtsName {
    /// Kernel name.
    pub sysname: &'static str,
    /// Kernel release.
    pub release: &'static str,
    /// Kernel version.
    pub version: &'static str,
    /// Machine (architecture) name.
    pub machine: &'static str,
    /// Bytes per field, terminator included.
    pub field_bytes: usize,
}

/// Mutable process-wide state visible to syscall handlers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessState {
    /// Thread id.
    pub pid: u64,
    /// Parent process id.
    pub ppid: u64,
    /// Thread-group id; what `getpid` reports.
    pub tgid: u64,
    /// Real user id.
    pub uid: u64,
    /// Effective user id.
    pub euid: u64,
    /// Real group id.
    pub gid: u64,
    /// Effective group id.
    pub egid: u64,
    /// Node name reported by `uname` and `gethostname`.
    pub hostname: String,
    /// Working directory reported by `getcwd`.
    pub cwd: String,
    /// Kernel identity.
    pub uts: UtsName,
    /// Initial program break; the break never drops below it.
    pub brk_start: u64,
    /// Current program break.
    pub brk_point: u64,
    /// One past the highest stack address.
    pub stack_base: u64,
    /// Bytes reserved for the stack.
    pub stack_size: u64,
    /// Lowest page touched by the initial frame.
    pub stack_min: u64,
    /// Growth limit of the stack.
    pub max_stack_size: u64,
    /// Where a second thread's stack would go.
    pub next_thread_stack_base: u64,
    /// First anonymous-mapping address.
    pub mmap_start: u64,
    /// Next anonymous-mapping address.
    pub mmap_end: u64,
    /// Exit code once the program has exited.
    pub exit_status: Option<i64>,
    /// Syscalls serviced so far.
    pub num_syscalls: u64,
}

/// Addresses of the initial stack frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StackLayout {
    /// Initial stack pointer (bias applied where the ABI has one).
    pub sp: u64,
    /// Number of arguments.
    pub argc: u64,
    /// Address of the argc word.
    pub argc_addr: u64,
    /// Address of `argv[0]`.
    pub argv: u64,
    /// Address of `envp[0]`.
    pub envp: u64,
    /// Address of the first auxiliary vector entry.
    pub auxv: u64,
}

/// Per-architecture process conventions.
pub trait ProcessArch: Isa {
    /// `uname` machine field.
    const UNAME_MACHINE: &'static str;
    /// Default top of the stack.
    const STACK_BASE: u64;
    /// Default first anonymous-mapping address.
    const MMAP_START: u64;
    /// Bias subtracted from the stack pointer.
    const STACK_BIAS: u64 = 0;
    /// Bytes the ABI reserves between the stack pointer and argc.
    const STACK_RESERVE: u64 = 0;

    /// Top of the stack when the configuration does not fix one.
    fn default_stack_base(_image: &LoadedImage) -> u64 {
        Self::STACK_BASE
    }

    /// Seeds entry registers after the stack is built and the PC is set.
    fn init_registers(
        tc: &mut ThreadContext<Self>,
        image: &LoadedImage,
        state: &ProcessState,
        stack: &StackLayout,
    );
}

/// A user program running under syscall emulation.
#[derive(Debug)]
pub struct EmulatedProcess<I, O>
where
    I: ProcessArch + SyscallTable<O>,
    O: OsPersonality,
{
    state: ProcessState,
    image: LoadedImage,
    argv: Vec<String>,
    envp: Vec<String>,
    syscalls: BTreeMap<u64, SyscallDesc<I>>,
    started: bool,
    restored: bool,
    _os: PhantomData<O>,
}

impl<I, O> EmulatedProcess<I, O>
where
    I: ProcessArch + SyscallTable<O>,
    O: OsPersonality,
{
    /// Creates a process for `image` that has not started yet.
    pub fn new(image: LoadedImage, config: &ProcessConfig) -> Self {
        let stack_base = config
            .stack_base
            .unwrap_or_else(|| I::default_stack_base(&image));
        let brk = image.brk_start(I::PAGE_BYTES);
        let mmap_start = config.mmap_start.unwrap_or(I::MMAP_START);

        let state = ProcessState {
            pid: config.pid,
            ppid: config.ppid,
            tgid: config.pid,
            uid: config.uid,
            euid: config.euid,
            gid: config.gid,
            egid: config.egid,
            hostname: config.hostname.clone(),
            cwd: config.cwd.clone(),
            uts: UtsName {
                sysname: O::SYSNAME,
                release: O::RELEASE,
                version: O::VERSION,
                machine: I::UNAME_MACHINE,
                field_bytes: O::UTSNAME_FIELD_BYTES,
            },
            brk_start: brk,
            brk_point: brk,
            stack_base,
            stack_size: config.stack_size,
            stack_min: stack_base,
            max_stack_size: config.max_stack_size,
            next_thread_stack_base: stack_base.saturating_sub(config.max_stack_size),
            mmap_start,
            mmap_end: mmap_start,
            exit_status: None,
            num_syscalls: 0,
        };

        Self {
            state,
            image,
            argv: config.argv.clone(),
            envp: config.envp.clone(),
            syscalls: <I as SyscallTable<O>>::SYSCALLS.iter().copied().collect(),
            started: false,
            restored: false,
            _os: PhantomData,
        }
    }

    /// Process-wide state.
    pub const fn state(&self) -> &ProcessState {
        &self.state
    }

    /// Mutable process-wide state.
    pub const fn state_mut(&mut self) -> &mut ProcessState {
        &mut self.state
    }

    /// Hostname reported to the program.
    pub fn hostname(&self) -> &str {
        &self.state.hostname
    }

    /// Thread-group id.
    pub const fn tgid(&self) -> u64 {
        self.state.tgid
    }

    /// Exit code, once the program has exited.
    pub const fn exit_status(&self) -> Option<i64> {
        self.state.exit_status
    }

    /// Returns `true` once `startup` has run.
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Looks up the descriptor for `num`.
    ///
    /// # Errors
    ///
    /// Returns [`SyscallError::UnknownCall`] for numbers outside the table and
    /// [`SyscallError::Unimplemented`] for placeholders.
    pub fn get_desc(&self, num: u64) -> Result<&SyscallDesc<I>, SyscallError> {
        let desc = self
            .syscalls
            .get(&num)
            .ok_or(SyscallError::UnknownCall { num })?;
        if matches!(desc.entry(), SyscallEntry::Unimplemented) {
            return Err(SyscallError::Unimplemented {
                num,
                name: desc.name(),
            });
        }
        Ok(desc)
    }

    /// Services the syscall `tc` is trapping on and writes the outcome into its registers.
    ///
    /// Unknown and unimplemented numbers do not stop the simulation; the program
    /// sees `ENOSYS`.
    pub fn syscall(&mut self, tc: &mut ThreadContext<I>) -> SyscallReturn {
        let num = tc.syscall_num();
        self.state.num_syscalls += 1;

        let ret = match self.get_desc(num).copied() {
            Ok(desc) => {
                debug!(num, name = desc.name(), "syscall");
                let mut ctx = SyscallContext {
                    num,
                    tc: &mut *tc,
                    process: &mut self.state,
                };
                desc.invoke(&mut ctx, <I as SyscallTable<O>>::ENOSYS)
            }
            Err(e) => {
                warn!(arch = %I::ID, os = O::NAME, error = %e, "returning ENOSYS");
                SyscallReturn::err(<I as SyscallTable<O>>::ENOSYS)
            }
        };

        set_syscall_return::<I>(ret, &mut tc.regs);
        ret
    }

    /// Places the image, builds the initial stack and seeds the entry registers.
    ///
    /// A process restored from a checkpoint already has this state, so the first
    /// call only marks it started.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::AlreadyStarted`] on a second call,
    /// [`ProcessError::StackTooSmall`] when the initial frame does not fit, or a
    /// memory error while placing the image.
    pub fn startup(&mut self, tc: &mut ThreadContext<I>) -> Result<(), ProcessError> {
        if self.started {
            return Err(ProcessError::AlreadyStarted);
        }
        if self.restored {
            debug!("process restored from checkpoint; skipping startup");
            self.started = true;
            return Ok(());
        }

        for seg in &self.image.segments {
            tc.mem.map(seg.vaddr, seg.end() - seg.vaddr)?;
            tc.mem.write(seg.vaddr, &seg.data)?;
        }

        let stack = self.build_stack(tc)?;
        tc.set_int_reg(I::STACK_POINTER_REG, stack.sp);
        tc.set_pc(self.image.entry);
        I::init_registers(tc, &self.image, &self.state, &stack);

        self.started = true;
        info!(
            arch = %I::ID,
            os = O::NAME,
            entry = format_args!("{:#x}", self.image.entry),
            sp = format_args!("{:#x}", stack.sp),
            argc = stack.argc,
            "process started"
        );
        Ok(())
    }

    fn build_stack(&mut self, tc: &mut ThreadContext<I>) -> Result<StackLayout, ProcessError> {
        let word = I::MACHINE_BYTES;
        let order = I::BYTE_ORDER;
        let st = &self.state;

        let aux = [
            (auxv::AT_PAGESZ, I::PAGE_BYTES),
            (auxv::AT_ENTRY, self.image.entry),
            (auxv::AT_UID, st.uid),
            (auxv::AT_EUID, st.euid),
            (auxv::AT_GID, st.gid),
            (auxv::AT_EGID, st.egid),
            (auxv::AT_NULL, 0),
        ];
        let argc = self.argv.len() as u64;
        let envc = self.envp.len() as u64;
        let string_bytes: u64 = self
            .argv
            .iter()
            .chain(&self.envp)
            .map(|s| s.len() as u64 + 1)
            .sum();
        let ptr_bytes = (1 + argc + 1 + envc + 1 + 2 * aux.len() as u64) * word;
        let needed = string_bytes + ptr_bytes + I::STACK_RESERVE + 32;

        let bottom = st
            .stack_base
            .checked_sub(st.stack_size)
            .filter(|_| needed <= st.stack_size)
            .ok_or(ProcessError::StackTooSmall {
                needed,
                available: st.stack_size.min(st.stack_base),
            })?;
        tc.mem.map(bottom, st.stack_size)?;

        let string_base = st.stack_base - string_bytes;
        let argc_addr = (string_base - ptr_bytes) & !15;

        let mut words = Vec::with_capacity((ptr_bytes / word) as usize);
        words.push(argc);
        let mut cursor = string_base;
        for (i, s) in self.argv.iter().chain(&self.envp).enumerate() {
            if i as u64 == argc {
                words.push(0);
            }
            tc.mem.write_cstring(cursor, s.as_bytes())?;
            words.push(cursor);
            cursor += s.len() as u64 + 1;
        }
        if envc == 0 {
            words.push(0);
        }
        words.push(0);
        for (tag, val) in aux {
            words.push(tag);
            words.push(val);
        }

        let mut addr = argc_addr;
        for w in words {
            tc.mem.write_uint(addr, w, word as usize, order)?;
            addr += word;
        }

        let frame_low = argc_addr - I::STACK_RESERVE;
        self.state.stack_min = frame_low & !(I::PAGE_BYTES - 1);
        Ok(StackLayout {
            sp: frame_low - I::STACK_BIAS,
            argc,
            argc_addr,
            argv: argc_addr + word,
            envp: argc_addr + word * (argc + 2),
            auxv: argc_addr + word * (argc + envc + 3),
        })
    }
}

impl<I, O> Serializable for EmulatedProcess<I, O>
where
    I: ProcessArch + SyscallTable<O>,
    O: OsPersonality,
{
    fn serialize(&self, out: &mut CheckpointOut, section: &str) {
        let st = &self.state;
        let mut s = out.section(section);
        s.param("pid", &st.pid);
        s.param("ppid", &st.ppid);
        s.param("tgid", &st.tgid);
        s.param("brk_start", &st.brk_start);
        s.param("brk_point", &st.brk_point);
        s.param("stack_base", &st.stack_base);
        s.param("stack_size", &st.stack_size);
        s.param("stack_min", &st.stack_min);
        s.param("max_stack_size", &st.max_stack_size);
        s.param("next_thread_stack_base", &st.next_thread_stack_base);
        s.param("mmap_start", &st.mmap_start);
        s.param("mmap_end", &st.mmap_end);
        s.param("num_syscalls", &st.num_syscalls);
        if let Some(code) = st.exit_status {
            s.param("exit_status", &code);
        }
    }

    fn unserialize(&mut self, cp: &Checkpoint, section: &str) -> Result<(), CheckpointError> {
        let s = cp.section(section)?;
        let state = ProcessState {
            pid: s.param("pid")?,
            ppid: s.param("ppid")?,
            tgid: s.param("tgid")?,
            brk_start: s.param("brk_start")?,
            brk_point: s.param("brk_point")?,
            stack_base: s.param("stack_base")?,
            stack_size: s.param("stack_size")?,
            stack_min: s.param("stack_min")?,
            max_stack_size: s.param("max_stack_size")?,
            next_thread_stack_base: s.param("next_thread_stack_base")?,
            mmap_start: s.param("mmap_start")?,
            mmap_end: s.param("mmap_end")?,
            num_syscalls: s.param("num_syscalls")?,
            exit_status: s.param_opt("exit_status")?,
            ..self.state.clone()
        };
        self.state = state;
        self.restored = true;
        Ok(())
    }
}

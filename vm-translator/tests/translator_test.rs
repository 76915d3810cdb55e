//! Executes translated VM programs on the Hack interpreter and checks
//! their run-time stack effects.

mod common;

use common::{Machine, ARG, LCL, SP, THAT, THIS};
use vm_translator::{translate, SourceFile};

fn assemble_single(vm_code: &str) -> String {
    let sources = [SourceFile::new("Test", vm_code)];
    let asm = translate(&sources, false).unwrap();
    hack_assembler::assemble(&asm).unwrap()
}

#[test]
fn add_leaves_sum_on_stack() {
    let binary = assemble_single("push constant 7\npush constant 8\nadd\n");
    let mut machine = Machine::load(&binary);
    machine.ram[SP] = 256;
    machine.run(1_000);
    assert_eq!(machine.ram[256], 15);
    assert_eq!(machine.ram[SP], 257);
}

#[test]
fn stack_arithmetic_mixed() {
    // (2 + 3) - (4 and 6), then negate
    let binary = assemble_single(
        "push constant 2\npush constant 3\nadd\npush constant 4\npush constant 6\nand\nsub\nneg\n",
    );
    let mut machine = Machine::load(&binary);
    machine.ram[SP] = 256;
    machine.run(1_000);
    assert_eq!(machine.ram[256], -1); // -(5 - 4)
    assert_eq!(machine.ram[SP], 257);
}

#[test]
fn comparisons_produce_all_ones_or_zero() {
    let binary = assemble_single(
        "push constant 3\npush constant 5\nlt\npush constant 3\npush constant 5\ngt\npush constant 7\npush constant 7\neq\n",
    );
    let mut machine = Machine::load(&binary);
    machine.ram[SP] = 256;
    machine.run(2_000);
    assert_eq!(machine.ram[256], -1); // 3 < 5
    assert_eq!(machine.ram[257], 0); // 3 > 5
    assert_eq!(machine.ram[258], -1); // 7 = 7
    assert_eq!(machine.ram[SP], 259);
}

#[test]
fn segment_traffic_round_trips() {
    let binary = assemble_single(
        "push constant 10\npop local 0\npush constant 21\npop argument 2\npush constant 36\npop this 6\npush constant 42\npop temp 5\npush local 0\npush argument 2\nadd\npush this 6\nadd\npush temp 5\nadd\n",
    );
    let mut machine = Machine::load(&binary);
    machine.ram[SP] = 256;
    machine.ram[LCL] = 300;
    machine.ram[ARG] = 400;
    machine.ram[THIS] = 3000;
    machine.run(5_000);
    assert_eq!(machine.ram[300], 10);
    assert_eq!(machine.ram[402], 21);
    assert_eq!(machine.ram[3006], 36);
    assert_eq!(machine.ram[10], 42); // temp 5 = RAM[5 + 5]
    assert_eq!(machine.ram[256], 109);
    assert_eq!(machine.ram[SP], 257);
}

#[test]
fn pointer_segment_addresses_this_and_that() {
    let binary = assemble_single(
        "push constant 3030\npop pointer 0\npush constant 3040\npop pointer 1\npush constant 32\npop this 2\npush constant 46\npop that 6\npush this 2\npush that 6\nadd\n",
    );
    let mut machine = Machine::load(&binary);
    machine.ram[SP] = 256;
    machine.run(5_000);
    assert_eq!(machine.ram[THIS], 3030);
    assert_eq!(machine.ram[THAT], 3040);
    assert_eq!(machine.ram[3032], 32);
    assert_eq!(machine.ram[3046], 46);
    assert_eq!(machine.ram[256], 78);
}

#[test]
fn call_and_return_restore_the_caller_frame() {
    let vm_code = "\
call F 0
label DONE
goto DONE
function F 2
push constant 3
return
";
    let binary = assemble_single(vm_code);
    let mut machine = Machine::load(&binary);
    machine.ram[SP] = 256;
    machine.ram[LCL] = 300;
    machine.ram[ARG] = 400;
    machine.ram[THIS] = 3000;
    machine.ram[THAT] = 3010;
    machine.run(5_000);

    // SP = caller SP + 1, with the return value on top.
    assert_eq!(machine.ram[SP], 257);
    assert_eq!(machine.ram[256], 3);
    assert_eq!(machine.ram[LCL], 300);
    assert_eq!(machine.ram[ARG], 400);
    assert_eq!(machine.ram[THIS], 3000);
    assert_eq!(machine.ram[THAT], 3010);
}

#[test]
fn arguments_reach_the_callee() {
    let vm_code = "\
push constant 12
push constant 30
call F 2
label DONE
goto DONE
function F 0
push argument 0
push argument 1
add
return
";
    let binary = assemble_single(vm_code);
    let mut machine = Machine::load(&binary);
    machine.ram[SP] = 256;
    machine.run(5_000);
    assert_eq!(machine.ram[256], 42);
    assert_eq!(machine.ram[SP], 257);
}

#[test]
fn recursive_program_runs_under_bootstrap() {
    // rec(n) = n + rec(n - 1), rec(0) = 0
    let sys = "\
function Sys.init 0
push constant 5
call Main.rec 1
label HALT
goto HALT
";
    let main = "\
function Main.rec 0
push argument 0
push constant 0
eq
if-goto BASE
push argument 0
push argument 0
push constant 1
sub
call Main.rec 1
add
return
label BASE
push constant 0
return
";
    let sources = [
        SourceFile::new("Sys", sys),
        SourceFile::new("Main", main),
    ];
    let asm = translate(&sources, true).unwrap();
    let binary = hack_assembler::assemble(&asm).unwrap();
    let mut machine = Machine::load(&binary);
    machine.run(100_000);

    // Sys.init runs with SP = 261; the call's return value lands there.
    assert_eq!(machine.ram[261], 15);
    assert_eq!(machine.ram[SP], 262);
}

#[test]
fn static_references_are_per_file() {
    let one = "function One.set 0\npush constant 11\npop static 0\npush constant 0\nreturn\n";
    let two = "function Two.set 0\npush constant 22\npop static 0\npush constant 0\nreturn\n";
    let sys = "\
function Sys.init 0
call One.set 0
pop temp 0
call Two.set 0
pop temp 0
label HALT
goto HALT
";
    let sources = [
        SourceFile::new("One", one),
        SourceFile::new("Sys", sys),
        SourceFile::new("Two", two),
    ];
    let asm = translate(&sources, true).unwrap();
    let binary = hack_assembler::assemble(&asm).unwrap();
    let mut machine = Machine::load(&binary);
    machine.run(50_000);

    // Each file's static 0 is a distinct variable; both values survive.
    let statics: Vec<i16> = (16..32).map(|i| machine.ram[i]).collect();
    assert!(statics.contains(&11));
    assert!(statics.contains(&22));
}

#[test]
fn translating_twice_is_byte_identical() {
    let vm_code = "push constant 1\npush constant 2\nlt\nif-goto T\nlabel T\n";
    let sources = [SourceFile::new("Main", vm_code)];
    let first = translate(&sources, false).unwrap();
    let second = translate(&sources, false).unwrap();
    assert_eq!(first, second);
}

//! Black-box coverage of the literal end-to-end scenarios from spec.md §8,
//! plus the bundled `instructions.vm` fixture that exercises every opcode
//! family in one program.

fn run(source: &str) -> String {
    let mut out = Vec::new();
    vm_cli::run_source(source, 2 * 1024 * 1024, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn mov_then_prn() {
    assert_eq!(run("mov eax, 1\nprn eax"), "1\n");
}

#[test]
fn push_then_pop_round_trips_through_prn() {
    assert_eq!(run("push 2\npop eax\nprn eax"), "2\n");
}

#[test]
fn cmp_pushf_pop_observes_the_flag_bits() {
    assert_eq!(run("cmp 1,1\npushf\npop eax\nprn eax"), "1\n");
    assert_eq!(run("cmp 1,2\npushf\npop eax\nprn eax"), "0\n");
    assert_eq!(run("cmp 2,1\npushf\npop eax\nprn eax"), "2\n");
}

#[test]
fn call_falls_through_to_jmp_and_ret_resumes_after_the_call_site() {
    let source = "call c\nprn 11\njmp done\nc:\nprn 10\nret\ndone:";
    assert_eq!(run(source), "10\n11\n");
}

#[test]
fn mod_then_rem_two_step() {
    assert_eq!(run("mov eax,14\nmod eax,4\nrem eax\nprn eax"), "2\n");
}

#[test]
fn bundled_instructions_fixture_reproduces_expected_stdout_byte_for_byte() {
    let source = include_str!("instructions.vm");
    let expected = "1\n2\n1\n0\n2\n1\n4\n6\n8\n11\n12\n14\n15\n16\n10\n11\n2\n";
    assert_eq!(run(source), expected);
}

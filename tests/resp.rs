use respkv::command::Cmd;
use respkv::frame::FrameQueue;

#[test]
fn frames_a_pipelined_mix_of_known_and_unknown_commands() {
    let mut q = FrameQueue::new();
    q.push_bytes(b"*1\r\n$4\r\nPING\r\n");
    q.push_bytes(b"*3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\n1\r\n");
    q.push_bytes(b"*2\r\n$3\r\nGET\r\n$1\r\na\r\n");

    let mut cmds = Vec::new();
    while let Some(v) = q.pop_value().unwrap() {
        cmds.push(Cmd::from_resp(&v));
    }

    assert_eq!(cmds.len(), 3);
    assert_eq!(cmds[0], Cmd::Unknown);
    assert_eq!(
        cmds[1],
        Cmd::Set {
            key: b"a".to_vec(),
            value: Some(b"1".to_vec()),
        }
    );
    assert_eq!(cmds[2], Cmd::Get { key: b"a".to_vec() });
}

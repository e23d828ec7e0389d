mod events_test;
